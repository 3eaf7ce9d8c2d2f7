#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Declare a [`Handler`](crate::engine::Handler) for one pattern category.
///
/// Expands to a call to [`create_handler`](crate::engine::create_handler) so
/// every category goes through the same factory.
#[macro_export]
macro_rules! handler {
    (
        name: $name:expr,
        category: $category:expr,
        priority: $priority:expr,
        description: $description:expr,
        matchers: [ $($matcher:expr),* $(,)? ],
        processor: $processor:expr
        $(,)?
    ) => {{
        $crate::engine::create_handler(
            $name,
            vec![ $($matcher as $crate::Matcher),* ],
            $processor,
            $crate::engine::HandlerMeta {
                category: $category,
                priority: $priority,
                description: $description,
            },
        )
    }};
}

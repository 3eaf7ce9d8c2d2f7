use recurrent::{HandlerTrace, ProcessDetails, RecurrenceOptions};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

pub fn print_run(details: &ProcessDetails, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Processing: \"{}\"", details.input), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Normalized ━━━", ansi::GRAY));
    match &details.normalized {
        Some(text) => println!("  {}", palette.paint(format!("\"{text}\""), ansi::BLUE)),
        None if details.metrics.cache_hit => println!("  {}", palette.dim("(answered from cache)")),
        None => println!("  {}", palette.dim("(fast path, not normalized)")),
    }

    if !details.handlers.is_empty() {
        println!("\n{}", palette.paint("━━━ Handlers ━━━", ansi::GRAY));
        for trace in &details.handlers {
            print_handler(trace, &palette);
        }
    }

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match &details.result {
        Some(result) => print_result(result, &palette),
        None => {
            println!("{}", palette.dim("  Pattern not understood"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • No handler recognised any part of the input");
            println!("  • Handlers were restricted with --only");
            println!("  • A value was rejected (interval 0, day outside 1..31)");
            println!("\n{}", palette.dim("  Tip: Set RUST_LOG=recurrent=debug to see matcher details"));
        }
    }

    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Normalize: {}  │  Handlers: {}/{} matched",
        palette.paint(format!("{:?}", details.metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", details.metrics.normalize), ansi::CYAN),
        palette.dim(details.metrics.handlers_matched.to_string()),
        palette.dim(details.metrics.handlers_run.to_string()),
    );
    println!();
}

fn print_handler(trace: &HandlerTrace, palette: &ansi::Palette) {
    let status = if trace.matched {
        palette.paint(format!("✓ {:.2}", trace.confidence), ansi::GREEN)
    } else {
        palette.dim("✗")
    };
    println!(
        "  {} {}  {}",
        palette.paint(format!("{:<10}", trace.name), ansi::BLUE),
        status,
        palette.dim(&trace.description)
    );

    if let Some(text) = &trace.matched_text {
        println!("      {} {}", palette.dim("text:"), palette.paint(format!("\"{text}\""), ansi::YELLOW));
    }
    for warning in &trace.warnings {
        println!("      {} {}", palette.paint("warning:", ansi::YELLOW), warning);
    }
}

fn print_result(result: &RecurrenceOptions, palette: &ansi::Palette) {
    if let Some(rrule) = result.to_rrule() {
        println!("  {}", palette.bold(palette.paint(rrule, ansi::GREEN)));
    }
    println!("      {} {:.2}", palette.dim("confidence:"), result.confidence);
    for warning in &result.warnings {
        println!("      {} {}", palette.paint("warning:", ansi::YELLOW), warning);
    }
}

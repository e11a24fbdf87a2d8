use std::path::Path;
use std::time::Duration;

use cellvision_core::geometry::Target;
use cellvision_core::pipeline::{PipelineConfig, RunSummary};
use cellvision_core::telemetry::TelemetryTable;
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
        }
    }
}

pub fn print_run_header(config: &PipelineConfig, source: &Path, video: Option<&Path>) {
    let s = Styles::new();
    let d = &config.detection;

    println!();
    println!("  {}", s.title.apply_to("CellVision"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(10)));
    println!();

    println!("  {:<14}{}", s.label.apply_to("Source"), s.path.apply_to(source.display()));
    match video {
        Some(path) => println!("  {:<14}{}", s.label.apply_to("Video"), s.path.apply_to(path.display())),
        None => println!("  {:<14}{}", s.label.apply_to("Video"), s.disabled.apply_to("off")),
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Frame"),
        s.value.apply_to(format!("{}x{}", config.frame.width, config.frame.height))
    );
    if config.camera.replay_loop {
        println!("  {:<14}{}", s.label.apply_to("Replay"), s.method.apply_to("loop"));
    }
    println!();

    println!("  {}", s.header.apply_to("Detection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("HSV"),
        s.value.apply_to(format!("{:?} .. {:?}", d.hsv_lower, d.hsv_upper))
    );
    println!("    {:<12}{}", s.label.apply_to("Gamma"), s.value.apply_to(d.gamma));
    println!("    {:<12}{}", s.label.apply_to("Opening"), s.value.apply_to(d.kernel_size));
    if d.median_blur > 1 {
        println!("    {:<12}{}", s.label.apply_to("Median"), s.value.apply_to(d.median_blur));
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Radius"),
        s.value.apply_to(format!("({}, {})", d.min_radius, d.max_radius))
    );
    println!();

    println!("  {}", s.header.apply_to("Telemetry"));
    println!("    {:<12}{}", s.label.apply_to("Table"), s.value.apply_to(&config.telemetry.table));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Stale"),
        s.method.apply_to(config.telemetry.stale_policy)
    );
    println!();
}

pub fn print_run_summary(summary: &RunSummary, table: &TelemetryTable, elapsed: Duration) {
    let s = Styles::new();
    let secs = elapsed.as_secs_f64();

    println!();
    println!("  {}", s.header.apply_to("Run"));
    println!("    {:<12}{}", s.label.apply_to("Captured"), s.value.apply_to(summary.frames_captured));
    println!("    {:<12}{}", s.label.apply_to("Processed"), s.value.apply_to(summary.frames_processed));
    println!("    {:<12}{}", s.label.apply_to("Dropped"), s.value.apply_to(summary.frames_dropped));
    println!("    {:<12}{}", s.label.apply_to("Targets"), s.value.apply_to(summary.targets_found));
    if secs > 0.0 {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Rate"),
            s.value.apply_to(format!("{:.1} fps", summary.frames_processed as f64 / secs))
        );
    }
    println!();

    let entries = table.snapshot();
    println!("  {}", s.header.apply_to(format!("Table {}", table.name())));
    if entries.is_empty() {
        println!("    {}", s.disabled.apply_to("empty"));
    }
    for (key, value) in entries {
        println!("    {:<26}{}", s.label.apply_to(key), s.value.apply_to(format!("{value:.3}")));
    }
    println!();
}

pub fn print_target(target: Option<&Target>) {
    let s = Styles::new();
    let Some(t) = target else {
        println!("  {}", s.disabled.apply_to("No target"));
        return;
    };
    let c = &t.candidate;
    println!("  {}", s.header.apply_to("Target"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Center"),
        s.value.apply_to(format!("({:.2}, {:.2})", c.center.x, c.center.y))
    );
    println!("    {:<12}{}", s.label.apply_to("Radius"), s.value.apply_to(format!("{:.2}", c.radius)));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Horizontal"),
        s.value.apply_to(format!("{:.2}\u{b0}", t.horizontal_angle))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Vertical"),
        s.value.apply_to(format!("{:.2}\u{b0}", t.vertical_angle))
    );
    println!("    {:<12}{}", s.label.apply_to("Distance"), s.value.apply_to(format!("{:.2}", t.distance)));
    println!("    {:<12}{}", s.label.apply_to("Vertices"), s.value.apply_to(c.polygon.len()));
}

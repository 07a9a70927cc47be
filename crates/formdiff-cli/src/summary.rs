use console::Style;
use formdiff_core::jobs::{JobRecord, JobStatus};
use formdiff_core::pipeline::{PipelineConfig, PipelineReport, PipelineRequest};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    ok: Style,
    failed: Style,
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
            ok: Style::new().green().bold(),
            failed: Style::new().red().bold(),
        }
    }
}

pub fn print_compare_summary(config: &PipelineConfig, request: &PipelineRequest, model: &str) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("formdiff"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(8)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("First"),
        s.path.apply_to(request.first.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Second"),
        s.path.apply_to(request.second.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(request.output_path().display())
    );
    println!();

    // Landmarks
    println!("  {}", s.header.apply_to("Landmarks"));
    if config.landmarks.model.is_some() {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Model"),
            s.method.apply_to(model)
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Model"),
            s.disabled.apply_to("none (landmarks zeroed)")
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(config.landmarks.threshold)
    );
    println!();

    // Selection
    println!("  {}", s.header.apply_to("Selection"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Keep"),
        s.value.apply_to(format!(
            "{:.1}%",
            config.selection.select_fraction * 100.0
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Context"),
        s.value
            .apply_to(format!("\u{00b1}{} samples", config.selection.context_radius))
    );
    println!();

    // Render
    println!("  {}", s.header.apply_to("Render"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Codec"),
        s.method.apply_to(&config.render.codec)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Frame rate"),
        s.value.apply_to(format!("{} fps", config.render.fps))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Sensitivity"),
        s.value.apply_to(config.render.region_sensitivity)
    );
    println!();
}

pub fn print_report(report: &PipelineReport) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Samples"),
        s.value.apply_to(report.samples)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Selected"),
        s.value.apply_to(report.selected_frames)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Written"),
        s.value.apply_to(report.frames_written)
    );
    if report.frames_skipped > 0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Unreadable"),
            s.disabled.apply_to(report.frames_skipped)
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Pose diverged"),
        s.value.apply_to(format!(
            "{} of {} frames",
            report.landmarks.significant_frames.len(),
            report.landmarks.min_length
        ))
    );
    println!();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Saved to"),
        s.path.apply_to(report.output.display())
    );
}

pub fn print_job_table(jobs: &[JobRecord]) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Jobs"));
    for job in jobs {
        let status = match job.status {
            JobStatus::Completed => s.ok.apply_to(job.status.to_string()),
            JobStatus::Failed => s.failed.apply_to(job.status.to_string()),
            JobStatus::Processing => s.disabled.apply_to(job.status.to_string()),
        };
        println!(
            "    {}  {:<11}{} vs {}",
            s.label.apply_to(job.id),
            status,
            job.first.display(),
            job.second.display()
        );
        match (&job.failure, job.frames_written) {
            (Some(failure), _) => println!(
                "      {} {}",
                s.failed.apply_to(failure.kind),
                s.label.apply_to(&failure.message)
            ),
            (None, Some(frames)) => println!(
                "      {} {}",
                s.path.apply_to(job.output.display()),
                s.label.apply_to(format!("({frames} frames)"))
            ),
            (None, None) => {}
        }
    }
    println!();
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("onion_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use onion_engine::Engine;
    use onion_engine::export::{ExportLabels, ExportMode, export_file_name};
    use onion_engine::params::{ParameterKind, SizePreset};
    use onion_engine::result::{CvOutcome, SimulationResult};
    use std::fs;
    use std::path::{Path, PathBuf};

    const USAGE: &str = r#"onion_cli (onion-engine)

USAGE:
  onion_cli run [parameters] [--compare]
  onion_cli export <single|batch_current|batch_full> [parameters] [options]
  onion_cli presets

PARAMETERS:
  --radius <mm>          Onion radius (20-70, default 40)
  --preset <name>        Use the radius of a size preset (small, medium, large)
  --layer <mm>           Layer thickness (1-8, default 3)
  --vertical <mm>        Vertical cut spacing (2-15, default 5)
  --cross <mm>           Cross cut spacing (2-15, default 5)
  --horizontal <count>   Number of horizontal cuts (0-10, default 0)

Values are clamped to their range and snapped to the slider step.

OPTIONS (run):
  --compare              Also run without horizontal cuts and report the CV change

OPTIONS (export):
  --out <path>           Output file (default: OnionLab_<lang>_<Data|FULL>_<date>.csv)
  --lang <code>          Language code used in the default file name (default: en)
  --overwrite            Overwrite an existing output file
  -h, --help             Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "run" => cmd_run(&mut args),
            "export" => cmd_export(&mut args),
            "presets" => {
                print_presets();
                Ok(())
            }
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_presets() {
        for preset in SizePreset::ALL {
            println!("{:<8} {} mm", preset.name(), preset.radius());
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let mut engine = Engine::new();
        let mut compare = false;

        while let Some(arg) = args.next() {
            if apply_parameter_flag(&mut engine, &arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--compare" => compare = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        engine.set_compare_mode(compare);
        engine.run_evaluation().map_err(|e| e.to_string())?;
        let result = engine.result().ok_or("simulation produced no result")?;
        print_result(result);

        if let Some(comparison) = engine.cv_comparison() {
            println!();
            println!("baseline cv (no horizontal cuts): {:.1}%", comparison.baseline_cv);
            match comparison.outcome {
                CvOutcome::Improvement { delta } => println!("cv change: -{delta:.1}%"),
                CvOutcome::NoBenefit => println!("cv change: no benefit"),
            }
        }

        if let Some(report) = engine.timing_report() {
            println!("time: {:.1} ms", report.total_ms());
        }
        Ok(())
    }

    fn cmd_export(args: &mut Args) -> Result<(), String> {
        let mode: ExportMode = args
            .next()
            .ok_or("missing export mode")?
            .parse()
            .map_err(|e: onion_engine::export::ExportError| e.to_string())?;

        let mut engine = Engine::new();
        let mut out: Option<PathBuf> = None;
        let mut lang = "en".to_string();
        let mut overwrite = false;

        while let Some(arg) = args.next() {
            if apply_parameter_flag(&mut engine, &arg, args)? {
                continue;
            }
            match arg.as_str() {
                "--out" => out = Some(PathBuf::from(args.value("--out")?)),
                "--lang" => lang = args.value("--lang")?,
                "--overwrite" => overwrite = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        if mode == ExportMode::Single {
            engine.run_evaluation().map_err(|e| e.to_string())?;
        }

        let path = out.unwrap_or_else(|| {
            let today = time::OffsetDateTime::now_utc().date();
            PathBuf::from(export_file_name(&lang, mode, today))
        });

        let document = engine
            .export_document(mode, &ExportLabels::default())
            .map_err(|e| e.to_string())?;
        write_text_file(&path, &document, overwrite)?;
        println!(
            "wrote {} rows to {}",
            document.lines().count().saturating_sub(1),
            path.display()
        );
        Ok(())
    }

    /// Consumes a parameter flag and its value. Returns `false` for other flags.
    fn apply_parameter_flag(engine: &mut Engine, flag: &str, args: &mut Args) -> Result<bool, String> {
        let kind = match flag {
            "--radius" => ParameterKind::Radius,
            "--layer" => ParameterKind::LayerThickness,
            "--vertical" => ParameterKind::VerticalSpacing,
            "--cross" => ParameterKind::CrossSpacing,
            "--horizontal" => ParameterKind::HorizontalCuts,
            "--preset" => {
                let preset: SizePreset = args
                    .value(flag)?
                    .parse()
                    .map_err(|e: onion_engine::params::ParamError| e.to_string())?;
                engine.apply_parameter(ParameterKind::Radius, preset.radius());
                return Ok(true);
            }
            _ => return Ok(false),
        };

        let raw = args.value(flag)?;
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("invalid number `{raw}` for {flag}"))?;
        if !value.is_finite() {
            return Err(format!("{flag} must be a finite number"));
        }
        let applied = engine.apply_parameter(kind, value);
        if (applied - value).abs() > f64::EPSILON {
            eprintln!("{flag} {raw} adjusted to {applied}");
        }
        Ok(true)
    }

    fn print_result(result: &SimulationResult) {
        let p = &result.parameters;
        println!(
            "R={} mm  Lt={} mm  Sv={} mm  Sc={} mm  H={}",
            p.radius, p.layer_thickness, p.vertical_spacing, p.cross_spacing, p.horizontal_cuts
        );
        println!("pieces:   {}", result.piece_count);
        println!("average:  {:.0} mm3", result.mean_volume);
        println!("median:   {:.0} mm3", result.median_volume);
        println!("max:      {:.0} mm3", result.max_volume);
        println!("std dev:  {:.1}", result.std_dev);
        println!("cv:       {:.1}%", result.cv);
        println!(
            "volume:   {:.0} mm3 (theoretical {:.0} mm3)",
            result.total_volume, result.theoretical_volume
        );

        let peak = result.histogram.counts.iter().copied().max().unwrap_or(0).max(1);
        println!();
        for (label, count) in result.histogram.pairs() {
            let bar = "#".repeat(count * 40 / peak);
            println!("{label:>12} {count:>5} {bar}");
        }
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        fs::write(path, text).map_err(|e| format!("write {}: {e}", path.display()))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}

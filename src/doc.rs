use colored::*;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::ProjectConfig;
use crate::error::{Error, Result};
use crate::process::{CommandLine, Executor, Outcome};

fn default_doxyfile(config: &ProjectConfig) -> String {
    format!(
        r#"PROJECT_NAME           = "drte"
OUTPUT_DIRECTORY       = {}
INPUT                  = {}
RECURSIVE              = YES
GENERATE_HTML          = YES
GENERATE_LATEX         = NO
OPTIMIZE_OUTPUT_FOR_C  = YES
EXTRACT_ALL            = YES
"#,
        config.doc.out.display(),
        config.source.display()
    )
}

/// Writes a minimal Doxyfile when doxygen is asked to read one that does
/// not exist yet.
fn ensure_doxyfile(config: &ProjectConfig) -> Result<()> {
    if Path::new(&config.doc.command).file_stem().and_then(|s| s.to_str()) != Some("doxygen") {
        return Ok(());
    }
    let Some(doxyfile) = config.doc.args.first().map(Path::new) else {
        return Ok(());
    };
    if doxyfile.exists() {
        return Ok(());
    }

    println!("   Creating default {}...", doxyfile.display());
    fs::write(doxyfile, default_doxyfile(config)).map_err(|e| Error::io(doxyfile, e))
}

fn run_generator(exec: &mut dyn Executor, command: &CommandLine) -> Result<Outcome> {
    let pb = indicatif::ProgressBar::new_spinner();
    pb.set_style(
        indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg}")
            .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
            .tick_chars("◜◠◝◞◡◟"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Running {}...", command.program()));

    let result = exec.execute(command);
    pb.finish_and_clear();
    result
}

/// Runs the configured documentation generator (`doxygen Doxyfile`).
pub fn generate_docs(exec: &mut dyn Executor, config: &ProjectConfig) -> Result<()> {
    println!("{} Generating documentation...", "📚".magenta());
    ensure_doxyfile(config)?;

    let command = CommandLine::new(config.doc.command.as_str()).args(config.doc.args.iter().cloned());
    println!("   {}", command.to_string().dimmed());
    debug!(command = %command, "running documentation generator");

    run_generator(exec, &command)?.check(&command)?;
    println!(
        "{} Documentation generated in {}",
        "✓".green(),
        config.doc.out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::{RecordingExecutor, failed};

    #[test]
    fn test_runs_configured_command() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = ProjectConfig::default();
        config.doc.command = "true".into();
        config.doc.args = vec![tmp.path().join("Doxyfile").display().to_string()];
        let mut exec = RecordingExecutor::default();

        generate_docs(&mut exec, &config).unwrap();

        assert_eq!(exec.calls.len(), 1);
        assert_eq!(exec.calls[0].program(), "true");
        assert!(!tmp.path().join("Doxyfile").exists());
    }

    #[test]
    fn test_creates_missing_doxyfile() {
        let tmp = tempfile::tempdir().unwrap();
        let doxyfile = tmp.path().join("Doxyfile");
        let mut config = ProjectConfig::default();
        config.doc.args = vec![doxyfile.display().to_string()];
        let mut exec = RecordingExecutor::default();

        generate_docs(&mut exec, &config).unwrap();

        let text = fs::read_to_string(&doxyfile).unwrap();
        assert!(text.contains("OUTPUT_DIRECTORY       = doc"));
        assert!(text.contains("INPUT                  = src"));
        assert_eq!(
            exec.lines(),
            vec![format!("doxygen {}", doxyfile.display())]
        );
    }

    #[test]
    fn test_generator_failure_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let doxyfile = tmp.path().join("Doxyfile");
        fs::write(&doxyfile, "").unwrap();
        let mut config = ProjectConfig::default();
        config.doc.args = vec![doxyfile.display().to_string()];
        let mut exec = RecordingExecutor::default();
        exec.respond("doxygen", failed(1, "error: tag INPUT: not found"));

        let err = generate_docs(&mut exec, &config).unwrap_err();

        assert!(matches!(err, Error::Toolchain { .. }));
    }
}

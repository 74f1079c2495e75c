use colored::*;

use crate::error::Error;

pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    /// Suggests a fix for a failed pipeline, if the failure looks familiar.
    pub fn for_error(err: &Error) -> Option<String> {
        match err {
            Error::Toolchain { stderr, .. } => Self::analyze(stderr),
            Error::Spawn { program, .. } => Some(format!(
                "Could not run {}.\nInstall it or point {} (or {}) at another compiler.",
                program.bold().yellow(),
                "compiler".bold().green(),
                "$CC".bold().green()
            )),
            Error::DuplicateTestIdentifier { .. } | Error::InvalidTestEntry(_) => Some(format!(
                "Test entry objects are named {}.\nRename the test source, then run {} to drop the stale object.",
                "test_<identifier>.o".bold().yellow(),
                "clean".bold().green()
            )),
            _ => None,
        }
    }

    pub fn analyze(output: &str) -> Option<String> {
        // 1. Main function missing (Specific Linker Error)
        if output.contains("undefined reference to `main'")
            || output.contains("undefined reference to 'main'")
            || output.contains("_main\", referenced from")
        {
            return Some(format!(
                "The link is missing a {} function.\nThe source directory needs a main.c; test entries need their own {}.",
                "main()".bold().yellow(),
                "main()".bold().yellow()
            ));
        }

        // 2. Missing symbol from another unit or library (Linker Error)
        if output.contains("undefined reference to") || output.contains("Undefined symbols") {
            return Some(format!(
                "It looks like a {} error.\nA source file may be missing from the source directory, or a library from {} in drte.toml.\nStale objects can also cause this; try {} first.",
                "Linker".bold().red(),
                "ldflags".bold().yellow(),
                "clean".bold().green()
            ));
        }

        // 3. Missing Header (Compiler Error)
        if output.contains("fatal error: ")
            && (output.contains("No such file or directory") || output.contains("file not found"))
        {
            return Some(format!(
                "It looks like a {} error.\nAdd the include path to {} in drte.toml.",
                "Missing Header".bold().red(),
                "cflags".bold().yellow()
            ));
        }

        // 4. Sanitizer runtime unavailable
        if output.contains("libclang_rt.asan") || output.contains("cannot find -lasan") {
            return Some(format!(
                "The {} runtime is not installed.\nInstall it, or drop -fsanitize=address from the devel/test {} and {}.",
                "AddressSanitizer".bold().red(),
                "cflags".bold().yellow(),
                "ldflags".bold().yellow()
            ));
        }

        None
    }
}

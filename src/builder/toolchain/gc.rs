//! The classic `gc` toolchain: `6g`/`6l`/`gopack` and friends.

use std::path::{Path, PathBuf};

use super::{Arch, CommandSpec, Toolchain};

/// `gc` toolchain for one architecture.
#[derive(Debug, Clone)]
pub struct GcToolchain {
    /// Target architecture
    pub arch: Arch,
    /// Path to the compiler (`6g`)
    pub compiler: PathBuf,
    /// Path to the linker (`6l`)
    pub linker: PathBuf,
    /// Path to the archiver (`gopack`)
    pub archiver: PathBuf,
}

impl GcToolchain {
    /// Create a toolchain from explicit tool paths.
    pub fn new(arch: Arch, compiler: PathBuf, linker: PathBuf, archiver: PathBuf) -> Self {
        GcToolchain {
            arch,
            compiler,
            linker,
            archiver,
        }
    }

    /// Create a toolchain using the conventional tool names, unresolved.
    pub fn with_default_names(arch: Arch) -> Self {
        GcToolchain::new(
            arch,
            PathBuf::from(Self::compiler_name(arch)),
            PathBuf::from(Self::linker_name(arch)),
            PathBuf::from(Self::archiver_name()),
        )
    }

    pub fn compiler_name(arch: Arch) -> String {
        format!("{}g", arch.letter())
    }

    pub fn linker_name(arch: Arch) -> String {
        format!("{}l", arch.letter())
    }

    pub fn archiver_name() -> &'static str {
        "gopack"
    }
}

impl Toolchain for GcToolchain {
    fn arch(&self) -> Arch {
        self.arch
    }

    fn compile_command(
        &self,
        output: &Path,
        files: &[&Path],
        search_paths: &[&Path],
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.compiler)
            .arg("-o")
            .arg(output.display().to_string());

        for dir in search_paths {
            cmd = cmd.arg("-I").arg(dir.display().to_string());
        }

        cmd.args(files.iter().map(|f| f.display().to_string()))
    }

    fn link_command(&self, output: &Path, object: &Path, search_paths: &[&Path]) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.linker)
            .arg("-o")
            .arg(output.display().to_string());

        for dir in search_paths {
            cmd = cmd.arg("-L").arg(dir.display().to_string());
        }

        cmd.arg(object.display().to_string())
    }

    fn archive_command(&self, archive: &Path, object: &Path) -> CommandSpec {
        CommandSpec::new(&self.archiver)
            .arg("grc")
            .arg(archive.display().to_string())
            .arg(object.display().to_string())
    }

    fn object_extension(&self) -> &str {
        self.arch.letter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amd64() -> GcToolchain {
        GcToolchain::with_default_names(Arch::Amd64)
    }

    #[test]
    fn test_compile_command() {
        let cmd = amd64().compile_command(
            Path::new("util.6"),
            &[Path::new("util/a.go"), Path::new("util/b.go")],
            &[],
        );
        assert_eq!(cmd.program, PathBuf::from("6g"));
        assert_eq!(cmd.args, ["-o", "util.6", "util/a.go", "util/b.go"]);
    }

    #[test]
    fn test_compile_command_with_search_path() {
        let cmd = amd64().compile_command(
            Path::new("main.6"),
            &[Path::new("main.go")],
            &[Path::new(".")],
        );
        assert_eq!(cmd.args, ["-o", "main.6", "-I", ".", "main.go"]);
    }

    #[test]
    fn test_link_command() {
        let cmd = amd64().link_command(Path::new("main"), Path::new("main.6"), &[]);
        assert_eq!(cmd.program, PathBuf::from("6l"));
        assert_eq!(cmd.args, ["-o", "main", "main.6"]);

        let cmd = amd64().link_command(Path::new("main"), Path::new("main.6"), &[Path::new(".")]);
        assert_eq!(cmd.args, ["-o", "main", "-L", ".", "main.6"]);
    }

    #[test]
    fn test_archive_command() {
        let cmd = amd64().archive_command(Path::new("util.a"), Path::new("util.6"));
        assert_eq!(cmd.program, PathBuf::from("gopack"));
        assert_eq!(cmd.args, ["grc", "util.a", "util.6"]);
    }

    #[test]
    fn test_names_follow_arch() {
        let tc = GcToolchain::with_default_names(Arch::I386);
        assert_eq!(tc.compiler, PathBuf::from("8g"));
        assert_eq!(tc.linker, PathBuf::from("8l"));
        assert_eq!(tc.object_extension(), "8");
        assert_eq!(tc.archive_extension(), "a");
    }
}

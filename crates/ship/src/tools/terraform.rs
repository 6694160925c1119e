//! Terraform command builders.

use std::path::{Path, PathBuf};

use super::Invocation;

/// Default binary name.
pub const BINARY: &str = "terraform";

/// Terraform, bound to a resolved binary.
#[derive(Debug, Clone)]
pub struct Terraform {
    bin: PathBuf,
}

impl Terraform {
    #[must_use]
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// `terraform --version`
    #[must_use]
    pub fn version(&self) -> Invocation {
        Invocation::new(&self.bin).arg("--version")
    }

    /// `terraform apply -state=<state> <config_dir>`
    #[must_use]
    pub fn apply(&self, config_dir: &Path, state: &Path) -> Invocation {
        Invocation::new(&self.bin)
            .arg("apply")
            .arg(format!("-state={}", state.display()))
            .arg(config_dir.display().to_string())
    }

    /// `terraform destroy -force <config_dir>`
    ///
    /// `-force` skips Terraform's own confirmation; the CLI asks first.
    #[must_use]
    pub fn destroy(&self, config_dir: &Path) -> Invocation {
        Invocation::new(&self.bin)
            .args(["destroy", "-force"])
            .arg(config_dir.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_args() {
        let tf = Terraform::new("terraform");
        let invocation = tf.apply(Path::new("."), &Path::new(".").join("terraform.tfstate"));
        assert_eq!(invocation.args_line(), "apply -state=./terraform.tfstate .");
    }

    #[test]
    fn test_destroy_args() {
        let tf = Terraform::new("/opt/terraform");
        let invocation = tf.destroy(Path::new("/work/out"));
        assert_eq!(invocation.program, PathBuf::from("/opt/terraform"));
        assert_eq!(invocation.args, vec!["destroy", "-force", "/work/out"]);
    }
}

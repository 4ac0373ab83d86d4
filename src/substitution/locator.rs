//! Collaborators used by `find`, `env` and `optenv`

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use crate::error::SubstitutionError;

/// Looks up the install path of a package
pub trait PackageLocator {
    fn find(&self, package: &str) -> Result<String, SubstitutionError>;
}

/// Reads environment variables
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// Locator backed by `rospack find <package>`
///
/// Every call spawns a new process; results are not cached.
#[derive(Debug, Clone)]
pub struct RospackLocator {
    program: String,
}

impl Default for RospackLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl RospackLocator {
    pub fn new() -> Self {
        Self {
            program: "rospack".to_string(),
        }
    }

    /// Use a different executable with the same `find <package>` interface
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PackageLocator for RospackLocator {
    fn find(&self, package: &str) -> Result<String, SubstitutionError> {
        log::debug!("running {} find {}", self.program, package);
        let output = Command::new(&self.program)
            .arg("find")
            .arg(package)
            .output()
            .map_err(|e| SubstitutionError::PackageResolution {
                package: package.to_string(),
                message: format!("could not run {}: {}", self.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() || stdout.contains("Error:") || stderr.contains("Error:") {
            let message = if stderr.is_empty() { stdout } else { stderr };
            return Err(SubstitutionError::PackageResolution {
                package: package.to_string(),
                message,
            });
        }
        Ok(stdout)
    }
}

/// Locator with a fixed package table
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    packages: HashMap<String, PathBuf>,
}

impl StaticLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the path for a package
    pub fn with_package(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(name, path);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.packages.insert(name.into(), path.into());
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageLocator for StaticLocator {
    fn find(&self, package: &str) -> Result<String, SubstitutionError> {
        self.packages
            .get(package)
            .map(|p| p.display().to_string())
            .ok_or_else(|| SubstitutionError::PackageResolution {
                package: package.to_string(),
                message: "package not registered".to_string(),
            })
    }
}

/// Tries each locator in order and returns the first hit
///
/// When every locator fails the error of the last one is returned.
#[derive(Default)]
pub struct ChainLocator {
    locators: Vec<Box<dyn PackageLocator>>,
}

impl ChainLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, locator: impl PackageLocator + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }
}

impl PackageLocator for ChainLocator {
    fn find(&self, package: &str) -> Result<String, SubstitutionError> {
        let mut last_error = SubstitutionError::PackageResolution {
            package: package.to_string(),
            message: "no package locator configured".to_string(),
        };
        for locator in &self.locators {
            match locator.find(package) {
                Ok(path) => return Ok(path),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

/// The environment of the current process
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed set of variables
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_locator_lookup() {
        let locator = StaticLocator::new().with_package("camera_driver", "/opt/ros/camera_driver");
        assert_eq!(locator.find("camera_driver").unwrap(), "/opt/ros/camera_driver");
        assert!(matches!(
            locator.find("lidar"),
            Err(SubstitutionError::PackageResolution { .. })
        ));
    }

    #[test]
    fn test_chain_locator_first_hit_wins() {
        let chain = ChainLocator::new()
            .with(StaticLocator::new().with_package("a", "/first/a"))
            .with(
                StaticLocator::new()
                    .with_package("a", "/second/a")
                    .with_package("b", "/second/b"),
            );
        assert_eq!(chain.find("a").unwrap(), "/first/a");
        assert_eq!(chain.find("b").unwrap(), "/second/b");
        assert!(chain.find("c").is_err());
    }

    #[test]
    fn test_empty_chain_fails() {
        let err = ChainLocator::new().find("a").unwrap_err();
        assert!(err.to_string().contains("no package locator"));
    }

    #[test]
    fn test_rospack_locator_reports_spawn_failure() {
        let locator = RospackLocator::with_program("launch-graph-no-such-program");
        let err = locator.find("pkg").unwrap_err();
        assert!(matches!(err, SubstitutionError::PackageResolution { package, .. } if package == "pkg"));
    }

    #[test]
    fn test_static_environment() {
        let env = StaticEnvironment::new().with_var("ROBOT", "pr2");
        assert_eq!(env.var("ROBOT").as_deref(), Some("pr2"));
        assert_eq!(env.var("HOME_NOT_SET"), None);
    }
}

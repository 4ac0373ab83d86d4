//! Substitution argument expansion
//!
//! Launch attributes may embed expressions of the form `$(keyword argument)`,
//! for example:
//!
//! ```text
//! <arg name="camera" default="front" />
//! <include file="$(find my_package)/launch/$(arg camera).launch" />
//! ```
//!
//! The resolver expands them one at a time until none remain. Package paths
//! and environment variables come from collaborators so that tests and
//! callers without a ROS installation can provide their own.

mod keyword;
mod locator;
mod resolver;

pub use keyword::Substitution;
pub use locator::{
    ChainLocator, Environment, PackageLocator, ProcessEnvironment, RospackLocator,
    StaticEnvironment, StaticLocator,
};
pub use resolver::{ArgumentTable, SubstitutionResolver, DEFAULT_MAX_SUBSTITUTIONS};

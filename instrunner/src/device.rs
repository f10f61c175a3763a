// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties of the device tests run on.

use std::fmt;
use tracing::{debug, warn};

/// Environment variable holding the SDK version for [`HostDeviceBuild`].
pub const SDK_INT_ENV: &str = "INSTRUNNER_SDK_INT";

/// Environment variable holding the hardware name for [`HostDeviceBuild`].
pub const HARDWARE_ENV: &str = "INSTRUNNER_HARDWARE";

/// Environment variable holding the release codename for [`HostDeviceBuild`].
pub const CODENAME_ENV: &str = "INSTRUNNER_CODENAME";

/// The SDK API level [`HostDeviceBuild`] reports when [`SDK_INT_ENV`] is unset or invalid.
///
/// No real device reports 0, and `@SdkSuppress` ranges start at 1, so every test annotated with
/// `@SdkSuppress` is skipped on a host run unless the variable is set.
pub const HOST_SDK_INT: i32 = 0;

/// The codename reported by release builds.
pub const RELEASE_CODENAME: &str = "REL";

/// Hardware names reported by emulators.
pub const EMULATOR_HARDWARE: &[&str] = &["goldfish", "ranchu", "gce_x86"];

/// Build properties of the device, as consulted by `@SdkSuppress` and `@RequiresDevice`.
pub trait DeviceBuild: fmt::Debug + Send + Sync {
    /// Returns the SDK API level.
    fn sdk_version_int(&self) -> i32;

    /// Returns the hardware name.
    fn hardware(&self) -> &str;

    /// Returns the release codename, [`RELEASE_CODENAME`] for release builds.
    fn codename(&self) -> &str;

    /// Returns true if the hardware is a known emulator.
    fn is_emulator(&self) -> bool {
        EMULATOR_HARDWARE.contains(&self.hardware())
    }
}

/// A [`DeviceBuild`] read from the environment of the current process.
///
/// Unset variables read as [`HOST_SDK_INT`], empty hardware and a release codename. Set
/// [`SDK_INT_ENV`] to the API level of the device being emulated, or tests annotated with
/// `@SdkSuppress` are skipped.
#[derive(Clone, Debug)]
pub struct HostDeviceBuild {
    sdk_int: i32,
    hardware: String,
    codename: String,
}

impl HostDeviceBuild {
    /// Reads the build properties from the environment.
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let sdk_int = match var(SDK_INT_ENV) {
            Some(value) => value.parse().unwrap_or_else(|err| {
                warn!("ignoring invalid {SDK_INT_ENV} value `{value}`: {err}");
                HOST_SDK_INT
            }),
            None => {
                debug!(
                    "{SDK_INT_ENV} is unset, using SDK {HOST_SDK_INT}: \
                     tests annotated with @SdkSuppress will be skipped"
                );
                HOST_SDK_INT
            }
        };
        Self {
            sdk_int,
            hardware: var(HARDWARE_ENV).unwrap_or_default(),
            codename: var(CODENAME_ENV).unwrap_or_else(|| RELEASE_CODENAME.to_owned()),
        }
    }
}

impl DeviceBuild for HostDeviceBuild {
    fn sdk_version_int(&self) -> i32 {
        self.sdk_int
    }

    fn hardware(&self) -> &str {
        &self.hardware
    }

    fn codename(&self) -> &str {
        &self.codename
    }
}

/// A [`DeviceBuild`] with fixed properties.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FixedDeviceBuild {
    /// The SDK API level.
    pub sdk_int: i32,

    /// The hardware name.
    pub hardware: String,

    /// The release codename.
    pub codename: String,
}

impl FixedDeviceBuild {
    /// Creates a release build of real hardware.
    pub fn new(sdk_int: i32, hardware: impl Into<String>) -> Self {
        Self {
            sdk_int,
            hardware: hardware.into(),
            codename: RELEASE_CODENAME.to_owned(),
        }
    }
}

impl DeviceBuild for FixedDeviceBuild {
    fn sdk_version_int(&self) -> i32 {
        self.sdk_int
    }

    fn hardware(&self) -> &str {
        &self.hardware
    }

    fn codename(&self) -> &str {
        &self.codename
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        annotation::{Annotation, SdkSuppress},
        description::Description,
        filter::{Filter, SdkSuppressFilter},
        registry::{ClassDef, MethodDef, TestRegistry},
    };
    use std::{collections::HashMap, sync::Arc};
    use test_case::test_case;

    fn host_build(vars: &[(&str, &str)]) -> HostDeviceBuild {
        let vars: HashMap<_, _> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        HostDeviceBuild::from_vars(|name| vars.get(name).cloned())
    }

    #[test]
    fn host_build_defaults() {
        let build = host_build(&[]);
        assert_eq!(build.sdk_version_int(), HOST_SDK_INT);
        assert_eq!(build.hardware(), "");
        assert_eq!(build.codename(), RELEASE_CODENAME);

        let build = host_build(&[(SDK_INT_ENV, "not-a-number")]);
        assert_eq!(build.sdk_version_int(), HOST_SDK_INT);
    }

    #[test]
    fn host_sdk_gates_min_sdk_tests() {
        let mut registry = TestRegistry::new();
        registry.register(
            ClassDef::new("a.Foo").with_method(MethodDef::test("testNewApi").with_annotation(
                Annotation::SdkSuppress(SdkSuppress {
                    min_sdk_version: 26,
                    ..SdkSuppress::default()
                }),
            )),
        );
        let class = registry.load("a.Foo").unwrap();
        let test = Description::for_method(&class, &class.methods()[0]);

        let unset = SdkSuppressFilter::new(Arc::new(host_build(&[])));
        assert!(!unset.should_run(&test), "unset SDK skips @SdkSuppress tests");

        let set = SdkSuppressFilter::new(Arc::new(host_build(&[(SDK_INT_ENV, "30")])));
        assert!(set.should_run(&test));
    }

    #[test_case("goldfish", true)]
    #[test_case("ranchu", true)]
    #[test_case("gce_x86", true)]
    #[test_case("walleye", false)]
    #[test_case("", false ; "empty")]
    fn is_emulator(hardware: &str, expected: bool) {
        assert_eq!(FixedDeviceBuild::new(30, hardware).is_emulator(), expected);
    }
}

// Copyright (c) The instrunner Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::Filter;
use crate::{annotation::REQUIRES_DEVICE, description::Description, device::DeviceBuild};
use std::sync::Arc;

/// Skips tests whose `@SdkSuppress` range excludes the device.
///
/// A method-level `@SdkSuppress` replaces a class-level one entirely.
#[derive(Clone, Debug)]
pub struct SdkSuppressFilter {
    device: Arc<dyn DeviceBuild>,
}

impl SdkSuppressFilter {
    /// Creates a new filter.
    pub fn new(device: Arc<dyn DeviceBuild>) -> Self {
        Self { device }
    }
}

impl Filter for SdkSuppressFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        let sdk_suppress = description.annotations().sdk_suppress().or_else(|| {
            description
                .class_annotations()
                .and_then(|annotations| annotations.sdk_suppress())
        });
        match sdk_suppress {
            Some(sdk_suppress) => {
                sdk_suppress.allows(self.device.sdk_version_int(), self.device.codename())
            }
            None => true,
        }
    }

    fn describe(&self) -> String {
        "skip tests annotated with SdkSuppress if necessary".to_owned()
    }
}

/// Skips tests annotated with `@RequiresDevice` when running on an emulator.
#[derive(Clone, Debug)]
pub struct RequiresDeviceFilter {
    device: Arc<dyn DeviceBuild>,
}

impl RequiresDeviceFilter {
    /// Creates a new filter.
    pub fn new(device: Arc<dyn DeviceBuild>) -> Self {
        Self { device }
    }
}

impl Filter for RequiresDeviceFilter {
    fn evaluate_test(&self, description: &Description) -> bool {
        !description.has_annotation(REQUIRES_DEVICE) || !self.device.is_emulator()
    }

    fn describe(&self) -> String {
        "skip tests annotated with RequiresDevice if necessary".to_owned()
    }
}

// Copyright 2026 the Execution Tape Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use si_emulator::Kernel;
use std::collections::HashMap;
use std::string::String;

/// Optional label resolver for profiling scopes.
///
/// Return `None` to fall back to the default id-based labels.
pub trait LabelResolver {
    /// Resolve a label for a work-group scope.
    fn work_group_label(&mut self, _id: u32, _kernel: &Kernel) -> Option<String> {
        None
    }
}

/// Default resolver that keeps stable id-based labels.
#[derive(Default, Debug)]
pub struct DefaultLabelResolver;

impl LabelResolver for DefaultLabelResolver {}

/// Resolver that prefixes work-group labels with the kernel name.
#[derive(Default, Debug)]
pub struct KernelNameResolver {
    cache: HashMap<(String, u32), String>,
}

impl LabelResolver for KernelNameResolver {
    fn work_group_label(&mut self, id: u32, kernel: &Kernel) -> Option<String> {
        let key = (String::from(kernel.name()), id);
        if let Some(label) = self.cache.get(&key) {
            return Some(label.clone());
        }
        let label = format!("{}:wg{id}", kernel.name());
        self.cache.insert(key, label.clone());
        Some(label)
    }
}

pub(crate) fn default_work_group_label(id: u32) -> String {
    format!("wg:{id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_emulator::KernelBuilder;

    #[test]
    fn kernel_name_labels_are_cached_per_kernel() {
        let a = KernelBuilder::new("scan").build().unwrap();
        let b = KernelBuilder::new("reduce").build().unwrap();
        let mut resolver = KernelNameResolver::default();
        assert_eq!(resolver.work_group_label(3, &a).as_deref(), Some("scan:wg3"));
        assert_eq!(resolver.work_group_label(3, &b).as_deref(), Some("reduce:wg3"));
        assert_eq!(resolver.work_group_label(3, &a).as_deref(), Some("scan:wg3"));
        assert_eq!(resolver.cache.len(), 2);
        assert_eq!(DefaultLabelResolver.work_group_label(3, &a), None);
        assert_eq!(default_work_group_label(3), "wg:3");
    }
}

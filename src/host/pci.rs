use super::runner::CommandRunner;
use crate::gpu::GpuVendor;
use std::{cell::RefCell, collections::HashMap};

/// Answers whether `lspci` lists a device from a given vendor.
///
/// The listing is read once, and each answer is kept for the lifetime of the value.
pub struct PciDevices<R> {
    runner:  R,
    listing: RefCell<Option<String>>,
    answers: RefCell<HashMap<GpuVendor, bool>>,
}

impl<R: CommandRunner> PciDevices<R> {
    pub fn new(runner: R) -> Self {
        PciDevices { runner, listing: RefCell::new(None), answers: RefCell::new(HashMap::new()) }
    }

    /// `GpuVendor::Unknown` names no device, so it is never found.
    pub fn has_vendor(&self, vendor: GpuVendor) -> bool {
        if vendor == GpuVendor::Unknown {
            return false;
        }

        if let Some(&answer) = self.answers.borrow().get(&vendor) {
            return answer;
        }

        let answer = self.with_listing(|listing| listing.to_lowercase().contains(vendor.as_str()));
        debug!("lspci lists {} device: {}", vendor, answer);
        self.answers.borrow_mut().insert(vendor, answer);
        answer
    }

    fn with_listing<T>(&self, func: impl FnOnce(&str) -> T) -> T {
        let mut listing = self.listing.borrow_mut();
        let listing = listing.get_or_insert_with(|| {
            match self.runner.run("lspci", &[], &[]).and_then(|output| output.into_result("lspci")) {
                Ok(output) => output.stdout,
                Err(why) => {
                    warn!("unable to list PCI devices: {}", why);
                    String::new()
                }
            }
        });

        func(listing)
    }
}

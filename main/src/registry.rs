use crate::packet::MacAddress;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Device {
    pub mac: MacAddress,
    pub ip: Ipv4Addr,
}

/// Devices seen so far, listed in the order they first replied.
///
/// A device is never removed: its address is the last one it reported.
#[derive(Debug, Default)]
pub struct Registry {
    addresses: HashMap<MacAddress, Ipv4Addr>,
    order: Vec<MacAddress>,
}

impl Registry {
    /// Returns `true` if `mac` was not known before.
    pub fn merge(&mut self, mac: MacAddress, ip: Ipv4Addr) -> bool {
        if self.addresses.insert(mac, ip).is_some() {
            false
        } else {
            log::info!("Discovered {} at {}", mac, ip);
            self.order.push(mac);
            true
        }
    }

    /// Overwrites the address of a known device without inserting unknown ones.
    pub fn update_ip(&mut self, mac: MacAddress, ip: Ipv4Addr) -> bool {
        match self.addresses.get_mut(&mac) {
            Some(address) => {
                *address = ip;
                true
            }
            None => false,
        }
    }

    pub fn list(&self) -> Vec<Device> {
        self.order
            .iter()
            .filter_map(|mac| self.find(*mac))
            .collect()
    }

    /// Looks up a device by its 1-based display position.
    pub fn get(&self, index: usize) -> Option<Device> {
        let mac = *self.order.get(index.checked_sub(1)?)?;
        self.find(mac)
    }

    pub fn find(&self, mac: MacAddress) -> Option<Device> {
        self.addresses
            .get(&mac)
            .map(|ip| Device { mac, ip: *ip })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A consistent view of the registry right after a round was merged.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RoundSummary {
    pub received: usize,
    pub accepted: usize,
    pub new_devices: usize,
    pub devices: Vec<Device>,
}

/// [Registry] shared between the discovery task and the command layer.
#[derive(Debug, Default, Clone)]
pub struct SharedRegistry {
    inner: Arc<Mutex<Registry>>,
}

impl SharedRegistry {
    /// Merges every reply of one round under a single lock.
    pub fn merge_round(
        &self,
        received: usize,
        replies: impl IntoIterator<Item = (MacAddress, Ipv4Addr)>,
    ) -> RoundSummary {
        let mut registry = self.lock();
        let mut accepted = 0;
        let mut new_devices = 0;
        for (mac, ip) in replies {
            accepted += 1;
            if registry.merge(mac, ip) {
                new_devices += 1;
            }
        }
        RoundSummary {
            received,
            accepted,
            new_devices,
            devices: registry.list(),
        }
    }

    pub fn update_ip(&self, mac: MacAddress, ip: Ipv4Addr) -> bool {
        self.lock().update_ip(mac, ip)
    }

    pub fn list(&self) -> Vec<Device> {
        self.lock().list()
    }

    pub fn get(&self, index: usize) -> Option<Device> {
        self.lock().get(index)
    }

    pub fn find(&self, mac: MacAddress) -> Option<Device> {
        self.lock().find(mac)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // Every mutation leaves the registry consistent, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

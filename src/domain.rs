use std::fmt;

/// The hardware scope an event or group is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    PhysicalChip,
    PhysicalCore,
    VirtualProcessorHomeCore,
    VirtualProcessorHomeChip,
    VirtualProcessorHomeNode,
    VirtualProcessorRemoteNode,
}

struct DomainInfo {
    code: u8,
    name: &'static str,
    index_semantics: &'static str,
    is_physical: bool,
}

const fn info(domain: Domain) -> DomainInfo {
    let (code, name, index_semantics, is_physical) = match domain {
        Domain::PhysicalChip => (0x01, "PHYSICAL_CHIP", "chip", true),
        Domain::PhysicalCore => (0x02, "PHYSICAL_CORE", "core", true),
        Domain::VirtualProcessorHomeCore => (0x03, "VIRTUAL_PROCESSOR_HOME_CORE", "vcpu", false),
        Domain::VirtualProcessorHomeChip => (0x04, "VIRTUAL_PROCESSOR_HOME_CHIP", "vcpu", false),
        Domain::VirtualProcessorHomeNode => (0x05, "VIRTUAL_PROCESSOR_HOME_NODE", "vcpu", false),
        Domain::VirtualProcessorRemoteNode => {
            (0x06, "VIRTUAL_PROCESSOR_REMOTE_NODE", "vcpu", false)
        }
    };
    DomainInfo {
        code,
        name,
        index_semantics,
        is_physical,
    }
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::PhysicalChip,
        Domain::PhysicalCore,
        Domain::VirtualProcessorHomeCore,
        Domain::VirtualProcessorHomeChip,
        Domain::VirtualProcessorHomeNode,
        Domain::VirtualProcessorRemoteNode,
    ];

    /// A physical-core event is registered once for each of these domains.
    pub const CORE_EXPANSION: [Domain; 5] = [
        Domain::PhysicalCore,
        Domain::VirtualProcessorHomeCore,
        Domain::VirtualProcessorHomeChip,
        Domain::VirtualProcessorHomeNode,
        Domain::VirtualProcessorRemoteNode,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|domain| domain.code() == code)
    }

    pub fn code(self) -> u8 {
        info(self).code
    }

    /// The symbolic name, e.g. `PHYSICAL_CHIP`.
    pub fn name(self) -> &'static str {
        info(self).name
    }

    /// What the per-event index value means under this domain.
    pub fn index_semantics(self) -> &'static str {
        info(self).index_semantics
    }

    pub fn is_physical(self) -> bool {
        info(self).is_physical
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw domain byte from a record, which may not name a known domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainCode(pub u8);

impl DomainCode {
    pub fn domain(self) -> Option<Domain> {
        Domain::from_code(self.0)
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.domain() {
            Some(domain) => f.write_str(domain.name()),
            None => write!(f, "unknown[{}]", self.0),
        }
    }
}

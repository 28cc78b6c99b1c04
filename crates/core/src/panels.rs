use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::registry::{CapabilityRegistry, Catalog, RegistryError};

/// Every kind of panel the layout knows how to mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    SearchResult,
    ParseError,
}

impl PanelKind {
    pub const ALL: &'static [PanelKind] = &[PanelKind::SearchResult, PanelKind::ParseError];

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelKind::SearchResult => "SearchResult",
            PanelKind::ParseError => "ParseError",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelKind::SearchResult => "Search results",
            PanelKind::ParseError => "Query errors",
        }
    }

    pub fn build(self, instance: u64) -> Panel {
        Panel {
            kind: self,
            instance,
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PanelKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RegistryError::UnknownCapability(s.to_string()))
    }
}

/// Opaque handle to a mounted panel. Each build yields a distinct instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    kind: PanelKind,
    instance: u64,
}

impl Panel {
    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    pub fn instance(&self) -> u64 {
        self.instance
    }
}

pub type PanelRegistry = CapabilityRegistry<Panel>;

/// Catalog of every [`PanelKind`]. Panels built from the same catalog get
/// increasing instance numbers starting at 1.
pub fn catalog() -> Catalog<Panel> {
    let next_instance = Rc::new(Cell::new(1u64));
    PanelKind::ALL.iter().fold(Catalog::new(), |catalog, kind| {
        let kind = *kind;
        let next_instance = Rc::clone(&next_instance);
        catalog.with(kind.as_str(), move || {
            let instance = next_instance.get();
            next_instance.set(instance + 1);
            kind.build(instance)
        })
    })
}

impl CapabilityRegistry<Panel> {
    pub fn add_kind(&self, kind: PanelKind) {
        // Every PanelKind is in the catalog built by `catalog()`.
        if let Err(err) = self.add(kind.as_str()) {
            tracing::warn!(kind = kind.as_str(), error = %err, "panel kind missing from catalog");
        }
    }

    pub fn remove_kind(&self, kind: PanelKind) {
        self.remove(kind.as_str());
    }
}

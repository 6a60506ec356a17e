use super::{Chantier, Phase, PhaseKey, PhaseLink, Sprint};
use crate::error::StoreError;
use crate::store::{collections, RoadmapStore};

/// Everything the roadmap reads from the store in one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoadmapSnapshot {
    pub chantiers: Vec<Chantier>,
    pub phases: Vec<Phase>,
    /// Sorted by start date regardless of sheet order.
    pub sprints: Vec<Sprint>,
    pub links: Vec<PhaseLink>,
}

impl RoadmapSnapshot {
    /// Read all four collections. Nothing is returned unless every read succeeds.
    pub fn load<S: RoadmapStore + ?Sized>(store: &mut S) -> Result<Self, StoreError> {
        let chantiers = store
            .read_collection(collections::CHANTIERS)?
            .iter()
            .filter_map(Chantier::from_row)
            .collect();
        let phases = store
            .read_collection(collections::PHASES)?
            .iter()
            .filter_map(Phase::from_row)
            .collect();
        let sprints = store
            .read_collection(collections::SPRINTS)?
            .iter()
            .filter_map(Sprint::from_row)
            .collect();
        let links = store
            .read_collection(collections::PHASE_LINKS)?
            .iter()
            .filter_map(PhaseLink::from_row)
            .collect();
        Ok(Self::new(chantiers, phases, sprints, links))
    }

    pub fn new(
        chantiers: Vec<Chantier>,
        phases: Vec<Phase>,
        mut sprints: Vec<Sprint>,
        links: Vec<PhaseLink>,
    ) -> Self {
        sprints.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
        Self {
            chantiers,
            phases,
            sprints,
            links,
        }
    }

    pub fn chantier(&self, name: &str) -> Option<&Chantier> {
        self.chantiers.iter().find(|c| c.name == name)
    }

    pub fn phase(&self, key: &PhaseKey) -> Option<&Phase> {
        self.phases
            .iter()
            .find(|p| p.chantier == key.chantier && p.name == key.phase)
    }

    /// Phases of one chantier, in sheet order.
    pub fn phases_of<'a>(&'a self, chantier: &'a str) -> impl Iterator<Item = &'a Phase> + 'a {
        self.phases.iter().filter(move |p| p.chantier == chantier)
    }

    pub fn links_of<'a>(&'a self, phase: &'a str) -> impl Iterator<Item = &'a PhaseLink> + 'a {
        self.links.iter().filter(move |l| l.phase == phase)
    }

    pub fn sprint(&self, name: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.name == name)
    }

    /// Patch a phase's name after a successful rename write, without a reload.
    pub(crate) fn rename_phase(&mut self, key: &PhaseKey, new_name: &str, with_links: bool) {
        if let Some(phase) = self
            .phases
            .iter_mut()
            .find(|p| p.chantier == key.chantier && p.name == key.phase)
        {
            phase.name = new_name.to_string();
        }
        if with_links {
            for link in self.links.iter_mut().filter(|l| l.phase == key.phase) {
                link.phase = new_name.to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::columns;
    use crate::store::{fields, MemoryStore};

    #[test]
    fn sprints_are_sorted_by_start_on_load() {
        let mut store = MemoryStore::new().with_rows(
            collections::SPRINTS,
            [
                fields([
                    (columns::SPRINT, "S2".to_string()),
                    (columns::START, "2025-01-20".to_string()),
                    (columns::END, "2025-02-03".to_string()),
                ]),
                fields([
                    (columns::SPRINT, "S1".to_string()),
                    (columns::START, "2025-01-06".to_string()),
                    (columns::END, "2025-01-20".to_string()),
                ]),
            ],
        );
        let snapshot = RoadmapSnapshot::load(&mut store).unwrap();
        let names: Vec<_> = snapshot.sprints.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["S1", "S2"]);
    }

    #[test]
    fn a_failed_read_yields_no_snapshot() {
        let mut store = MemoryStore::new();
        store.fail_reads(true);
        assert!(RoadmapSnapshot::load(&mut store).is_err());
    }
}

use std::fs;
use std::fmt;
use std::path::Path;
use std::io::Write;

use log::info;
use memtally_address::AddressRange;

use crate::accountant::Accountant;
use crate::error::ReportError;

pub const REPORT_BEGIN: &str = "==== memtally report begin ====";
pub const REPORT_END: &str = "==== memtally report end ====";

/// Final counters of one monitored region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTally {
    pub id: u64,
    pub range: AddressRange,
    pub reads: u64,
    pub writes: u64,
}

impl fmt::Display for RegionTally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store ID: {}, reads: {}, (over)writes: {}", self.id, self.reads, self.writes)
    }
}

/// Every region's final counters, by ascending ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub tallies: Vec<RegionTally>,
}

impl Report {
    pub fn get(&self, id: u64) -> Option<&RegionTally> {
        self.tallies.iter().find(|t| t.id == id)
    }

    pub fn render(&self) -> String {
        self.tallies.iter()
            .map(|t| format!("{}\n", t))
            .collect()
    }

    /// Echoes the report to the log, between the begin and end markers.
    pub fn log(&self) {
        info!("{}", REPORT_BEGIN);
        for tally in self.tallies.iter() {
            info!("{}", tally);
        }
        info!("{}", REPORT_END);
    }
}

impl From<&Accountant> for Report {
    fn from(accountant: &Accountant) -> Self {
        Self { tallies: accountant.snapshot() }
    }
}

/// Writes the accountant's final state to `artifact` and the log.
///
/// The artifact is opened before anything is written anywhere, so an unopenable path fails
/// without a partial report in the log.
pub fn emit(accountant: &Accountant, artifact: impl AsRef<Path>) -> Result<Report, ReportError> {
    let path = artifact.as_ref();
    let mut file = fs::File::create(path)
        .map_err(|source| ReportError::Artifact { path: path.to_path_buf(), source })?;

    let report = Report::from(accountant);
    report.log();

    file.write_all(report.render().as_bytes())
        .and_then(|_| file.flush())
        .map_err(|source| ReportError::Write { path: path.to_path_buf(), source })?;

    info!("Report for {} region(s) written to {}", report.tallies.len(), path.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use memtally_accesslog::AccessKind;

    use crate::accountant::Accountant;
    use crate::error::ReportError;
    use crate::report::{emit, Report};
    use crate::registry::{LoadOptions, RegionRegistry};

    fn accountant() -> Accountant {
        let registry = RegionRegistry::parse_str("9, 900, 4\n1, 100, 4\n", LoadOptions::default()).unwrap();
        let accountant = Accountant::new(&registry);
        accountant.record(100, 4, AccessKind::Read);
        accountant.record(101, 1, AccessKind::Write);
        accountant.record(902, 8, AccessKind::Write);
        accountant
    }

    #[test]
    fn report_lines_are_ordered_by_id() {
        let report = Report::from(&accountant());

        assert_eq!(
            report.render(),
            "Store ID: 1, reads: 1, (over)writes: 1\nStore ID: 9, reads: 0, (over)writes: 1\n"
        );
    }

    #[test]
    fn rendering_a_frozen_state_is_deterministic() {
        let accountant = accountant();

        assert_eq!(Report::from(&accountant).render(), Report::from(&accountant).render());
    }

    #[test]
    fn emit_writes_the_artifact() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("report.txt");

        let report = emit(&accountant(), &path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), report.render());
        assert_eq!(report.get(9).unwrap().writes, 1);
    }

    #[test]
    fn emitting_a_frozen_state_twice_writes_identical_artifacts() {
        let directory = tempfile::tempdir().unwrap();
        let first = directory.path().join("first.txt");
        let second = directory.path().join("second.txt");
        let accountant = accountant();

        assert_eq!(emit(&accountant, &first).unwrap(), emit(&accountant, &second).unwrap());
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());

        emit(&accountant, &first).unwrap();
        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
    }

    #[test]
    fn emit_fails_when_the_artifact_cannot_be_opened() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("missing").join("report.txt");

        let result = emit(&accountant(), &path);

        assert!(matches!(result, Err(ReportError::Artifact { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn empty_registry_renders_an_empty_report() {
        let report = Report::from(&Accountant::new(&RegionRegistry::new()));

        assert_eq!(report.render(), "");
    }
}

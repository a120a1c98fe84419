//! JSON run report

use serde::Serialize;

use crate::filter::FilterStats;
use crate::program::ResolvedProgram;
use crate::verify::VerifyReport;

/// JSON structure for the resolved program (internal serialization)
#[derive(Serialize)]
struct ProgramJson<'a> {
    pmt_pid: u16,
    pcr_pid: u16,
    elementary_pids: &'a [u16],
}

/// JSON structure for a complete run (internal serialization)
#[derive(Serialize)]
struct ReportJson<'a> {
    ts_time: String,
    input: &'a str,
    output: &'a str,
    program: ProgramJson<'a>,
    stats: &'a FilterStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    verify: Option<&'a VerifyReport>,
}

/// Report generator for filter runs
pub struct Reporter;

impl Reporter {
    pub fn run_json(
        input: &str,
        output: &str,
        program: &ResolvedProgram,
        stats: &FilterStats,
        verify: Option<&VerifyReport>,
    ) -> anyhow::Result<String> {
        let rep = ReportJson {
            ts_time: chrono::Utc::now().to_rfc3339(),
            input,
            output,
            program: ProgramJson {
                pmt_pid: program.pids.pmt_pid(),
                pcr_pid: program.pids.pcr_pid(),
                elementary_pids: program.pids.elementary(),
            },
            stats,
            verify,
        };
        Ok(serde_json::to_string_pretty(&rep)?)
    }
}

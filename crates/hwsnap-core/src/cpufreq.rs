//! CPU frequency scaling state from `/sys/devices/system/cpu/cpufreq`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::error::Error;
use crate::report::Report;
use crate::sysfs;

const CPUFREQ: &str = "/sys/devices/system/cpu/cpufreq";

/// One scaling policy: a group of CPUs sharing a governor and frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct CpufreqPolicy {
    pub cpus: BTreeSet<u32>,
    pub governor: String,
    /// Residency from `stats/time_in_state`, if the kernel provides it:
    /// frequency in kHz to time spent at it.
    pub stats: Option<BTreeMap<u64, u64>>,
    /// Current frequency in kHz.
    pub current: u64,
}

impl CpufreqPolicy {
    /// Parse one `policy<N>` directory.
    pub fn parse(policy: &Path) -> Result<CpufreqPolicy, Error> {
        let cpus_path = policy.join("affected_cpus");
        let cpus_text = sysfs::read_required(&cpus_path)?;
        let mut cpus = BTreeSet::new();
        for token in cpus_text.split_whitespace() {
            cpus.insert(sysfs::parse_value(&cpus_path, token)?);
        }

        let stats = if policy.join("stats").is_dir() {
            let table_path = policy.join("stats/time_in_state");
            let table = sysfs::read_required(&table_path)?;
            let mut stats = BTreeMap::new();
            for line in table.lines() {
                let mut fields = line.split_whitespace();
                let (Some(freq), Some(time)) = (fields.next(), fields.next()) else {
                    return Err(Error::Parse {
                        path: table_path,
                        detail: format!("bad time_in_state line: {line:?}"),
                    });
                };
                stats.insert(
                    sysfs::parse_value(&table_path, freq)?,
                    sysfs::parse_value(&table_path, time)?,
                );
            }
            Some(stats)
        } else {
            None
        };

        Ok(CpufreqPolicy {
            cpus,
            governor: sysfs::read_required(&policy.join("scaling_governor"))?,
            stats,
            current: sysfs::read_parse(&policy.join("scaling_cur_freq"))?,
        })
    }

    /// Structured form with residency keys stringified for JSON.
    pub fn to_json(&self) -> Value {
        json!({
            "cpus": self.cpus,
            "governor": self.governor,
            "current_frequency": self.current,
            "stats": self.stats.as_ref().map(|stats| {
                let mut map = Map::new();
                for (freq, time) in stats {
                    map.insert(freq.to_string(), json!(time));
                }
                Value::Object(map)
            }),
        })
    }
}

impl fmt::Display for CpufreqPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cpus = if self.cpus.len() == 1 {
            self.cpus.iter().next().map(u32::to_string).unwrap_or_default()
        } else {
            let list: Vec<String> = self.cpus.iter().map(u32::to_string).collect();
            format!("{{{}}}", list.join(", "))
        };
        write!(f, "CPU {cpus} frequency governor: {}", self.governor)?;
        if let Some(stats) = &self.stats {
            // One pass worth of total residency, reused for every line.
            let total: u64 = stats.values().sum();
            for (&freq, &time) in stats {
                let marker = if freq == self.current { '*' } else { ' ' };
                let mhz = freq / 1000;
                let share = if total > 0 {
                    time as f64 / total as f64
                } else {
                    0.0
                };
                let percent = format!("{:.4}%", share * 100.0);
                write!(f, "\n{marker} {mhz:>4} MHz  {percent:>9}")?;
            }
        }
        Ok(())
    }
}

/// Every scaling policy on the system, ordered by policy number.
#[derive(Debug, Clone, PartialEq)]
pub struct Cpufreq {
    pub policies: Vec<CpufreqPolicy>,
}

impl Cpufreq {
    /// Read all policies from the live system. A kernel without cpufreq
    /// support yields an empty report rather than an error.
    pub fn read() -> Result<Cpufreq, Error> {
        Cpufreq::read_from(Path::new(CPUFREQ))
    }

    /// Read all `policy<N>` directories under an alternate root.
    pub fn read_from(root: &Path) -> Result<Cpufreq, Error> {
        let entries = match sysfs::sorted_entries(root) {
            Ok(entries) => entries,
            Err(err) if err.is_missing() => Vec::new(),
            Err(err) => return Err(err),
        };
        let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
        for path in entries {
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(digits) = name.strip_prefix("policy") else {
                continue;
            };
            let Ok(number) = digits.parse::<u32>() else {
                continue;
            };
            numbered.push((number, path));
        }
        numbered.sort_by_key(|(number, _)| *number);

        let mut policies = Vec::new();
        for (_, path) in numbered {
            policies.push(CpufreqPolicy::parse(&path)?);
        }
        Ok(Cpufreq { policies })
    }
}

impl fmt::Display for Cpufreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blocks: Vec<String> = self.policies.iter().map(CpufreqPolicy::to_string).collect();
        write!(f, "{}", blocks.join("\n"))
    }
}

impl Report for Cpufreq {
    fn to_json(&self) -> Value {
        Value::Array(self.policies.iter().map(CpufreqPolicy::to_json).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy_dir(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for (file, content) in files {
            let path = dir.join(file);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        dir
    }

    #[test]
    fn parses_a_full_policy() {
        let root = tempfile::tempdir().unwrap();
        let dir = policy_dir(
            root.path(),
            "policy0",
            &[
                ("affected_cpus", "0 1 2 3\n"),
                ("scaling_governor", "ondemand\n"),
                ("scaling_cur_freq", "1000000\n"),
                ("stats/time_in_state", "600000 100\n1000000 300\n"),
            ],
        );
        let policy = CpufreqPolicy::parse(&dir).unwrap();
        assert_eq!(policy.cpus, BTreeSet::from([0, 1, 2, 3]));
        assert_eq!(policy.governor, "ondemand");
        assert_eq!(policy.current, 1_000_000);
        assert_eq!(
            policy.stats,
            Some(BTreeMap::from([(600_000, 100), (1_000_000, 300)]))
        );
    }

    #[test]
    fn stats_are_optional() {
        let root = tempfile::tempdir().unwrap();
        let dir = policy_dir(
            root.path(),
            "policy0",
            &[
                ("affected_cpus", "0\n"),
                ("scaling_governor", "performance\n"),
                ("scaling_cur_freq", "1800000\n"),
            ],
        );
        let policy = CpufreqPolicy::parse(&dir).unwrap();
        assert_eq!(policy.stats, None);
        assert_eq!(policy.to_string(), "CPU 0 frequency governor: performance");
    }

    #[test]
    fn residency_marks_the_current_frequency() {
        let policy = CpufreqPolicy {
            cpus: BTreeSet::from([0, 1, 2, 3]),
            governor: "ondemand".to_string(),
            stats: Some(BTreeMap::from([(600_000, 100), (1_000_000, 300)])),
            current: 1_000_000,
        };
        let expected = "CPU {0, 1, 2, 3} frequency governor: ondemand\n\
                        \x20  600 MHz   25.0000%\n\
                        * 1000 MHz   75.0000%";
        assert_eq!(policy.to_string(), expected);
    }

    #[test]
    fn json_stringifies_residency_keys() {
        let policy = CpufreqPolicy {
            cpus: BTreeSet::from([0]),
            governor: "powersave".to_string(),
            stats: Some(BTreeMap::from([(600_000, 42)])),
            current: 600_000,
        };
        assert_eq!(
            policy.to_json(),
            json!({
                "cpus": [0],
                "governor": "powersave",
                "current_frequency": 600_000,
                "stats": {"600000": 42},
            })
        );
    }

    #[test]
    fn absent_stats_serialize_as_null() {
        let policy = CpufreqPolicy {
            cpus: BTreeSet::from([0]),
            governor: "performance".to_string(),
            stats: None,
            current: 1_800_000,
        };
        assert_eq!(policy.to_json()["stats"], Value::Null);
    }

    #[test]
    fn policies_come_back_in_numeric_order() {
        let root = tempfile::tempdir().unwrap();
        for (name, freq) in [
            ("policy10", "1000000\n"),
            ("policy2", "200000\n"),
            ("policy0", "600000\n"),
            ("ondemand", "1\n"),
            ("policyX", "2\n"),
        ] {
            policy_dir(
                root.path(),
                name,
                &[
                    ("affected_cpus", "0\n"),
                    ("scaling_governor", "ondemand\n"),
                    ("scaling_cur_freq", freq),
                ],
            );
        }
        let cpufreq = Cpufreq::read_from(root.path()).unwrap();
        // Numeric, not lexical: policy2 before policy10; non-policy
        // directories are ignored.
        let currents: Vec<u64> = cpufreq.policies.iter().map(|p| p.current).collect();
        assert_eq!(currents, [600_000, 200_000, 1_000_000]);
    }

    #[test]
    fn missing_root_yields_an_empty_report() {
        let root = tempfile::tempdir().unwrap();
        let cpufreq = Cpufreq::read_from(&root.path().join("cpufreq")).unwrap();
        assert!(cpufreq.policies.is_empty());
        assert_eq!(cpufreq.to_string(), "");
        assert_eq!(cpufreq.to_json(), json!([]));
    }

    #[test]
    fn malformed_time_in_state_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let dir = policy_dir(
            root.path(),
            "policy0",
            &[
                ("affected_cpus", "0\n"),
                ("scaling_governor", "ondemand\n"),
                ("scaling_cur_freq", "600000\n"),
                ("stats/time_in_state", "600000\n"),
            ],
        );
        let err = CpufreqPolicy::parse(&dir).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}

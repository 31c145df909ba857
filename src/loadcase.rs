// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::{Branch, Bus, BusType};
use anyhow::{anyhow, bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Case file layout for JSON input and output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub buses: Vec<Bus>,
    #[serde(default)]
    pub branches: Vec<Branch>,
}

/// Loads a case from a JSON file or from a directory holding `bus.csv`
/// and `branch.csv`.
pub fn load_case(case_path: &Path) -> Result<(Vec<Bus>, Vec<Branch>)> {
    if case_path.is_dir() {
        let bus_path = case_path.join("bus.csv");
        let branch_path = case_path.join("branch.csv");

        let buses = read_buses(
            File::open(&bus_path).with_context(|| format!("opening {}", bus_path.display()))?,
        )
        .with_context(|| format!("reading {}", bus_path.display()))?;

        let branches = if branch_path.exists() {
            read_branches(
                File::open(&branch_path)
                    .with_context(|| format!("opening {}", branch_path.display()))?,
            )
            .with_context(|| format!("reading {}", branch_path.display()))?
        } else {
            Vec::default()
        };

        Ok((buses, branches))
    } else {
        let file =
            File::open(case_path).with_context(|| format!("opening {}", case_path.display()))?;
        let case = read_json(file).with_context(|| format!("reading {}", case_path.display()))?;
        Ok((case.buses, case.branches))
    }
}

pub fn read_json<R: Read>(rdr: R) -> Result<Case> {
    Ok(serde_json::from_reader(rdr)?)
}

/// Reads bus rows:
///
/// ```txt
/// BusId, Type, Vmag, Vang(deg), PG, QG, PL, QL[, Qmin, Qmax]
/// ```
///
/// Type codes are 1=Slack, 2=PV, 3=PQ. Empty Qmin/Qmax fields mean
/// unlimited.
pub fn read_buses<R: Read>(rdr: R) -> Result<Vec<Bus>> {
    let mut buses = Vec::new();
    for (line, record) in reader(rdr).records().enumerate() {
        let record = record?;
        let bus = parse_bus(&record).with_context(|| format!("bus row {}", line + 1))?;
        buses.push(bus);
    }
    Ok(buses)
}

/// Reads branch rows:
///
/// ```txt
/// FromBus, ToBus, R, X, B
/// ```
pub fn read_branches<R: Read>(rdr: R) -> Result<Vec<Branch>> {
    let mut branches = Vec::new();
    for (line, record) in reader(rdr).records().enumerate() {
        let record = record?;
        let branch = parse_branch(&record).with_context(|| format!("branch row {}", line + 1))?;
        branches.push(branch);
    }
    Ok(branches)
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr)
}

fn parse_bus(record: &StringRecord) -> Result<Bus> {
    if record.len() < 8 {
        bail!("expected at least 8 fields, found {}", record.len());
    }
    let code: u8 = field(record, 1)?;
    let bus_type = BusType::try_from(code).map_err(|e| anyhow!(e))?;

    Ok(Bus {
        id: field(record, 0)?,
        bus_type,
        vm: field(record, 2)?,
        va: field(record, 3)?,
        pg: field(record, 4)?,
        qg: field(record, 5)?,
        pl: field(record, 6)?,
        ql: field(record, 7)?,
        qmin: opt_field(record, 8)?,
        qmax: opt_field(record, 9)?,
    })
}

fn parse_branch(record: &StringRecord) -> Result<Branch> {
    if record.len() < 5 {
        bail!("expected 5 fields, found {}", record.len());
    }
    Ok(Branch::new(
        field(record, 0)?,
        field(record, 1)?,
        field(record, 2)?,
        field(record, 3)?,
        field(record, 4)?,
    ))
}

fn field<T>(record: &StringRecord, k: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let s = record
        .get(k)
        .ok_or_else(|| anyhow!("missing field {}", k + 1))?;
    s.parse::<T>()
        .with_context(|| format!("field {}: invalid value {:?}", k + 1, s))
}

fn opt_field(record: &StringRecord, k: usize) -> Result<Option<f64>> {
    match record.get(k) {
        None | Some("") => Ok(None),
        Some(_) => field(record, k).map(Some),
    }
}

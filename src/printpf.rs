// Copyright (c) 2022-2024, Richard Lincoln. All rights reserved.

use crate::network::BusType;
use crate::pf::PowerFlowResult;
use std::io::Write;

fn type_name(t: BusType) -> &'static str {
    match t {
        BusType::Slack => "Slack",
        BusType::PV => "PV",
        BusType::PQ => "PQ",
    }
}

/// Prints power flow results to `fd`.
pub fn printpf<W: Write>(result: &PowerFlowResult, fd: &mut W) -> std::io::Result<()> {
    let rule = "=".repeat(80);
    let dash = "-".repeat(80);

    writeln!(fd, "{}", rule)?;
    writeln!(
        fd,
        "| {:<76} |",
        format!(
            "{} power flow {} in {} iterations",
            result.algorithm.name(),
            if result.converged {
                "converged"
            } else if result.cancelled {
                "cancelled"
            } else {
                "did not converge"
            },
            result.iterations
        )
    )?;
    writeln!(fd, "{}", rule)?;

    if !result.demoted.is_empty() {
        let ids: Vec<String> = result.demoted.iter().map(|id| id.to_string()).collect();
        writeln!(fd, "PV buses converted to PQ: {}", ids.join(", "))?;
    }

    writeln!(fd)?;
    writeln!(fd, "Bus Data")?;
    writeln!(fd, "{}", dash)?;
    writeln!(
        fd,
        " Bus  Type     Voltage            Generation            Load"
    )?;
    writeln!(
        fd,
        "   #         Mag(pu) Ang(deg)    P (pu)    Q (pu)     P (pu)    Q (pu)"
    )?;
    writeln!(fd, "{}", dash)?;
    for b in &result.buses {
        let t = if b.effective_type != b.bus_type {
            format!("{}*", type_name(b.effective_type))
        } else {
            type_name(b.bus_type).to_string()
        };
        writeln!(
            fd,
            "{:4}  {:<6} {:7.4} {:8.3}  {:9.4} {:9.4}  {:9.4} {:9.4}",
            b.id, t, b.vm, b.va, b.pg, b.qg, b.pl, b.ql
        )?;
    }

    writeln!(fd)?;
    writeln!(fd, "Branch Data")?;
    writeln!(fd, "{}", dash)?;
    writeln!(
        fd,
        "  #   From   To    From Injection       To Injection          Loss"
    )?;
    writeln!(
        fd,
        "                  P (pu)    Q (pu)    P (pu)    Q (pu)    P (pu)    Q (pu)"
    )?;
    writeln!(fd, "{}", dash)?;
    for br in &result.branches {
        writeln!(
            fd,
            "{:3} {:5} {:5} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4}",
            br.index + 1,
            br.from,
            br.to,
            br.pf,
            br.qf,
            br.pt,
            br.qt,
            br.p_loss,
            br.q_loss
        )?;
    }

    let s = &result.summary;
    writeln!(fd)?;
    writeln!(fd, "System Summary")?;
    writeln!(fd, "{}", dash)?;
    writeln!(
        fd,
        "Total generation     {:9.4} pu  {:9.4} pu",
        s.total_gen_p, s.total_gen_q
    )?;
    writeln!(
        fd,
        "Total load           {:9.4} pu  {:9.4} pu",
        s.total_load_p, s.total_load_q
    )?;
    writeln!(
        fd,
        "Total losses         {:9.4} pu  {:9.4} pu",
        s.total_loss_p, s.total_loss_q
    )?;
    writeln!(
        fd,
        "Voltage magnitude    min {:.4} (bus {})  max {:.4} (bus {})",
        s.vm_min, s.vm_min_bus, s.vm_max, s.vm_max_bus
    )?;
    writeln!(
        fd,
        "                     avg {:.4}  std {:.4}",
        s.vm_avg, s.vm_std
    )?;
    writeln!(
        fd,
        "Outside [{:.2}, {:.2}]  {} under, {} over",
        s.voltage_band.vmin,
        s.voltage_band.vmax,
        s.under_voltage.len(),
        s.over_voltage.len()
    )?;

    Ok(())
}

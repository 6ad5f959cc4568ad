use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::ctx::Ctx;
use crate::records::Feature;

pub fn write_tsv(path: &Path, ctx: &Ctx) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    write!(w, "patient_id")?;
    for feature in Feature::ALL {
        write!(w, "\t{}", feature.name())?;
    }
    writeln!(w, "\tNSP\tclassification\trisk_level\trisk_score\tmodel_version")?;

    for patient in &ctx.patients {
        write!(w, "{}", patient.id)?;
        for feature in Feature::ALL {
            write!(w, "\t{:.6}", patient.ctg_features.get(feature))?;
        }
        writeln!(
            w,
            "\t{}\t{}\t{}\t{:.2}\t{}",
            patient.ctg_features.nsp,
            patient.classification,
            patient.risk_level.as_str(),
            patient.risk_score,
            patient.model_version.replace('\t', " ")
        )?;
    }
    w.flush()?;

    Ok(())
}

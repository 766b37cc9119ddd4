use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use keymatch_core::{ShapeDescriptor, LOG_BINS, RADIAL_BINS, SAMPLE_POINTS};
use log::{info, warn};
use crate::{KeyMatchError, KeyMatchResult};

/// Reference descriptors stored as comma-separated text.
///
/// The first line is `numKeys,pointsPerKey,numRadialBins,numLogBins`; every
/// following line is `keyIndex,pointIndex,radialBin,logBin,frequency`, with
/// the records of one key kept together and keys in increasing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDatabase {
    descriptors: Vec<ShapeDescriptor>,
}

fn database_error(line: usize, message: impl Into<String>) -> KeyMatchError {
    KeyMatchError::Database {
        line,
        message: message.into(),
    }
}

fn parse_fields<const N: usize>(line_no: usize, line: &str) -> KeyMatchResult<[usize; N]> {
    let mut fields = [0usize; N];
    let mut parts = line.split(',');
    for field in fields.iter_mut() {
        let part = parts
            .next()
            .ok_or_else(|| database_error(line_no, format!("expected {} fields", N)))?;
        *field = part
            .trim()
            .parse()
            .map_err(|_| database_error(line_no, format!("invalid number '{}'", part.trim())))?;
    }
    if parts.next().is_some() {
        return Err(database_error(line_no, format!("expected {} fields", N)));
    }
    Ok(fields)
}

impl ReferenceDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptors(&self) -> &[ShapeDescriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Append a descriptor and return its index
    pub fn push(&mut self, descriptor: ShapeDescriptor) -> usize {
        self.descriptors.push(descriptor);
        self.descriptors.len() - 1
    }

    pub fn read_from<R: BufRead>(reader: R) -> KeyMatchResult<Self> {
        let mut lines = reader.lines().enumerate();

        let declared_keys = loop {
            match lines.next() {
                None => return Ok(Self::new()),
                Some((_, line)) if line.as_ref().is_ok_and(|l| l.trim().is_empty()) => continue,
                Some((i, line)) => {
                    let [keys, points, radial, log] = parse_fields::<4>(i + 1, &line?)?;
                    if (points, radial, log) != (SAMPLE_POINTS, RADIAL_BINS, LOG_BINS) {
                        return Err(database_error(
                            i + 1,
                            format!(
                                "descriptor dimensions {}x{}x{} differ from {}x{}x{}",
                                points, radial, log, SAMPLE_POINTS, RADIAL_BINS, LOG_BINS
                            ),
                        ));
                    }
                    break keys;
                }
            }
        };

        let mut descriptors: Vec<ShapeDescriptor> = Vec::new();
        let mut last_key: Option<usize> = None;

        for (i, line) in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let line_no = i + 1;
            let [key, point, radial, log, frequency] = parse_fields::<5>(line_no, &line)?;

            if point >= SAMPLE_POINTS || radial >= RADIAL_BINS || log >= LOG_BINS {
                return Err(database_error(
                    line_no,
                    format!("bin ({}, {}, {}) out of range", point, radial, log),
                ));
            }
            let frequency = u32::try_from(frequency)
                .map_err(|_| database_error(line_no, format!("frequency {} too large", frequency)))?;

            match last_key {
                Some(last) if key == last => {}
                Some(last) if key < last => {
                    return Err(database_error(
                        line_no,
                        format!("key {} appears after key {}; keys must be grouped in increasing order", key, last),
                    ));
                }
                _ => {
                    descriptors.push(ShapeDescriptor::new());
                    last_key = Some(key);
                }
            }

            if let Some(descriptor) = descriptors.last_mut() {
                descriptor.set(point, radial, log, frequency);
            }
        }

        if declared_keys != descriptors.len() {
            warn!(
                "database header declares {} keys but {} were read",
                declared_keys,
                descriptors.len()
            );
        }
        Ok(Self { descriptors })
    }

    /// Write the header and one record per histogram cell, zeros included
    pub fn write_to<W: Write>(&self, mut writer: W) -> KeyMatchResult<()> {
        writeln!(writer, "{},{},{},{}", self.descriptors.len(), SAMPLE_POINTS, RADIAL_BINS, LOG_BINS)?;
        for (key, descriptor) in self.descriptors.iter().enumerate() {
            for point in 0..SAMPLE_POINTS {
                for radial in 0..RADIAL_BINS {
                    for log in 0..LOG_BINS {
                        writeln!(writer, "{},{},{},{},{}", key, point, radial, log, descriptor.get(point, radial, log))?;
                    }
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> KeyMatchResult<Self> {
        let path = path.as_ref();
        let database = Self::read_from(BufReader::new(std::fs::File::open(path)?))?;
        info!("loaded {} reference keys from {}", database.len(), path.display());
        Ok(database)
    }

    /// Like [`load`](Self::load), but a missing file is an empty database
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> KeyMatchResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("{} does not exist yet, starting an empty database", path.display());
            return Ok(Self::new());
        }
        Self::load(path)
    }

    /// Rewrite the whole file, header included
    pub fn save<P: AsRef<Path>>(&self, path: P) -> KeyMatchResult<()> {
        let path = path.as_ref();
        self.write_to(BufWriter::new(std::fs::File::create(path)?))?;
        info!("saved {} reference keys to {}", self.len(), path.display());
        Ok(())
    }
}

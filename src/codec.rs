//! Binary model format.
//!
//! Positional, little-endian, no header or checksum:
//!
//! | field | encoding |
//! |---|---|
//! | classification flag | 1 byte, `0` or `1` |
//! | topology length `L+1` | `i32` |
//! | topology values | `L+1` x `i32` |
//! | weight layers `1..=L` | `(NPL[l-1]+1) * (NPL[l]+1)` x `f64` each, column-major |
//!
//! The weight count of each layer is implied by the topology read earlier in the stream.
//! Activation and delta buffers are not stored; they are rebuilt on load.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::info;

use crate::{AugmentedMatrix, BiasSlot, Error, Mlp, Result, Topology};

impl Mlp {
    /// Encode the model into `w`.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&[u8::from(self.is_classification())])?;

        let sizes = self.topology().as_slice();
        write_i32(w, sizes.len())?;
        for &n in sizes {
            write_i32(w, n)?;
        }

        for layer in self.weight_layers() {
            for &v in layer.as_slice() {
                w.write_all(&v.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Decode a model from `r` with the default [`BiasSlot`].
    ///
    /// The file does not record the bias-slot policy. A model trained under
    /// [`BiasSlot::Overwritten`] must be read back with [`Mlp::read_from_with`] to predict
    /// the same values.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        Self::read_from_with(r, BiasSlot::default())
    }

    /// Decode a model from `r` and run it under `bias_slot`.
    pub fn read_from_with<R: Read>(r: &mut R, bias_slot: BiasSlot) -> Result<Self> {
        let is_classification = match read_array::<R, 1>(r)? {
            [0] => false,
            [1] => true,
            [b] => {
                return Err(Error::InvalidData(format!(
                    "classification flag must be 0 or 1, got {b}"
                )));
            }
        };

        let count = read_count(r, "topology length")?;
        if count < 2 {
            return Err(Error::InvalidData(format!(
                "topology length must be >= 2, got {count}"
            )));
        }

        let mut sizes = Vec::with_capacity(count.min(1024));
        for l in 0..count {
            let n = read_count(r, "layer size")?;
            if n == 0 {
                return Err(Error::InvalidData(format!("layer {l} has 0 neurons")));
            }
            sizes.push(n);
        }
        let topology = Topology::new(&sizes)?;

        let mut weights = Vec::with_capacity(topology.last_layer());
        for (i, w) in sizes.windows(2).enumerate() {
            let (rows, cols) = (w[0] + 1, w[1] + 1);
            let len = rows.checked_mul(cols).ok_or_else(|| {
                Error::InvalidData(format!("weight layer {} shape overflows", i + 1))
            })?;

            let mut data = Vec::with_capacity(len.min(1 << 20));
            for _ in 0..len {
                data.push(f64::from_le_bytes(read_array::<R, 8>(r)?));
            }
            let matrix = AugmentedMatrix::from_col_major(rows, cols, data).ok_or_else(|| {
                Error::InvalidData(format!("weight layer {} has the wrong length", i + 1))
            })?;
            weights.push(matrix);
        }

        Ok(Mlp::from_parts(topology, is_classification, weights)?.with_bias_slot(bias_slot))
    }

    /// Write the model to `path`, truncating any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let p = path.as_ref();
        let file = File::create(p).map_err(|e| Error::io(p, e))?;
        let mut w = BufWriter::new(file);
        self.write_to(&mut w).map_err(|e| Error::io(p, e))?;
        w.flush().map_err(|e| Error::io(p, e))?;

        info!(
            "saved model {:?} ({} weights, classification={}) to {}",
            self.topology().as_slice(),
            self.topology().num_weights(),
            self.is_classification(),
            p.display()
        );
        Ok(())
    }

    /// Read a model from `path` with the default [`BiasSlot`].
    ///
    /// See [`Mlp::load_with_bias_slot`] for models trained under another policy.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_bias_slot(path, BiasSlot::default())
    }

    /// Read a model from `path` and run it under `bias_slot`.
    pub fn load_with_bias_slot<P: AsRef<Path>>(path: P, bias_slot: BiasSlot) -> Result<Self> {
        let p = path.as_ref();
        let file = File::open(p).map_err(|e| Error::io(p, e))?;
        let mut r = BufReader::new(file);
        let mlp = Self::read_from_with(&mut r, bias_slot).map_err(|e| match e {
            Error::InvalidData(msg) => Error::InvalidData(format!("{}: {msg}", p.display())),
            other => other,
        })?;

        info!(
            "loaded model {:?} (classification={}, bias_slot={:?}) from {}",
            mlp.topology().as_slice(),
            mlp.is_classification(),
            mlp.bias_slot(),
            p.display()
        );
        Ok(mlp)
    }

    /// Replace this model with the one stored at `path`.
    ///
    /// The file is decoded into a separate model first; on any error `self` is left as it
    /// was. The current [`BiasSlot`] setting is kept.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let loaded = Self::load_with_bias_slot(path, self.bias_slot())?;
        *self = loaded;
        Ok(())
    }
}

fn write_i32<W: Write>(w: &mut W, value: usize) -> io::Result<()> {
    let v = i32::try_from(value).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{value} does not fit the i32 model format"),
        )
    })?;
    w.write_all(&v.to_le_bytes())
}

fn read_count<R: Read>(r: &mut R, what: &str) -> Result<usize> {
    let v = i32::from_le_bytes(read_array::<R, 4>(r)?);
    usize::try_from(v).map_err(|_| Error::InvalidData(format!("{what} must be >= 0, got {v}")))
}

fn read_array<R: Read, const N: usize>(r: &mut R) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    r.read_exact(&mut buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            Error::InvalidData("model stream ended unexpectedly".to_owned())
        }
        _ => Error::InvalidData(format!("failed to read model stream: {e}")),
    })?;
    Ok(buf)
}

use crate::foundation::{
    core::FrameIndex,
    error::{RenderqError, RenderqResult},
};

/// A channel value pinned to a frame.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframe {
    /// Frame the key sits on.
    pub frame: FrameIndex,
    /// Channel value at that frame.
    pub value: f64,
}

/// One animated channel, e.g. `location[1]`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FCurve {
    /// Animated property, e.g. `location`.
    pub data_path: String,
    /// Component of the property, e.g. `1` for Y.
    #[serde(default)]
    pub array_index: usize,
    /// Keys of the channel.
    #[serde(default)]
    pub keys: Vec<Keyframe>, // sorted by frame, at most one key per frame
}

impl FCurve {
    /// An empty channel.
    pub fn new(data_path: impl Into<String>, array_index: usize) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            keys: Vec::new(),
        }
    }

    /// Reject unsorted or duplicate keys.
    pub fn validate(&self) -> RenderqResult<()> {
        if !self.keys.windows(2).all(|w| w[0].frame < w[1].frame) {
            return Err(RenderqError::keyframe(format!(
                "keys of '{}[{}]' must be strictly sorted by frame",
                self.data_path, self.array_index
            )));
        }
        Ok(())
    }

    /// The key exactly at `frame`, if any.
    pub fn key_at(&self, frame: FrameIndex) -> Option<&Keyframe> {
        self.keys
            .binary_search_by_key(&frame, |k| k.frame)
            .ok()
            .map(|idx| &self.keys[idx])
    }

    /// Insert a key, replacing the value of an existing key at the same frame.
    pub fn insert(&mut self, frame: FrameIndex, value: f64) {
        match self.keys.binary_search_by_key(&frame, |k| k.frame) {
            Ok(idx) => self.keys[idx].value = value,
            Err(idx) => self.keys.insert(idx, Keyframe { frame, value }),
        }
    }

    /// Remove and return the key at `frame`.
    pub fn remove(&mut self, frame: FrameIndex) -> Option<Keyframe> {
        let idx = self.keys.binary_search_by_key(&frame, |k| k.frame).ok()?;
        Some(self.keys.remove(idx))
    }

    /// Linear interpolation between neighbouring keys, holding the first/last value outside the
    /// keyed range.
    pub fn sample(&self, frame: FrameIndex) -> Option<f64> {
        let first = self.keys.first()?;
        let idx = self.keys.partition_point(|k| k.frame <= frame);
        if idx == 0 {
            return Some(first.value);
        }
        if idx >= self.keys.len() {
            return Some(self.keys[self.keys.len() - 1].value);
        }

        let a = &self.keys[idx - 1];
        let b = &self.keys[idx];
        let t = ((frame.0 - a.frame.0) as f64) / ((b.frame.0 - a.frame.0) as f64);
        Some(a.value + (b.value - a.value) * t)
    }
}

/// Keyframe data of one object: every animated channel.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Action {
    /// One curve per animated channel.
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

impl Action {
    /// Validate every curve.
    pub fn validate(&self) -> RenderqResult<()> {
        self.fcurves.iter().try_for_each(FCurve::validate)
    }

    /// The curve for a channel, if it is animated.
    pub fn fcurve(&self, data_path: &str, array_index: usize) -> Option<&FCurve> {
        self.fcurves
            .iter()
            .find(|c| c.data_path == data_path && c.array_index == array_index)
    }

    /// Return the curve for a channel, creating an empty one on first use.
    pub fn fcurve_mut(&mut self, data_path: &str, array_index: usize) -> &mut FCurve {
        let pos = self
            .fcurves
            .iter()
            .position(|c| c.data_path == data_path && c.array_index == array_index);
        let idx = match pos {
            Some(idx) => idx,
            None => {
                self.fcurves.push(FCurve::new(data_path, array_index));
                self.fcurves.len() - 1
            }
        };
        &mut self.fcurves[idx]
    }

    /// Sample a channel; `None` when the channel has no keys.
    pub fn sample(&self, data_path: &str, array_index: usize, frame: FrameIndex) -> Option<f64> {
        self.fcurve(data_path, array_index)?.sample(frame)
    }

    /// Flattened `(channel, frame, value)` view, handy for comparing snapshots.
    pub fn keyframe_set(&self) -> Vec<(String, usize, FrameIndex, u64)> {
        self.fcurves
            .iter()
            .flat_map(|c| {
                c.keys.iter().map(move |k| {
                    (
                        c.data_path.clone(),
                        c.array_index,
                        k.frame,
                        k.value.to_bits(),
                    )
                })
            })
            .collect()
    }
}

/// Remove the key at `frame` from every curve of the action. Returns how many keys were removed.
pub fn delete_keyframe(action: &mut Action, frame: FrameIndex) -> usize {
    action
        .fcurves
        .iter_mut()
        .filter_map(|c| c.remove(frame))
        .count()
}

/// Copy the key at `from` into `to` on every curve that has a key at `from`.
///
/// Fails when no curve is keyed at `from`: the caller expects a baked sequence.
pub fn copy_keyframe(action: &mut Action, from: FrameIndex, to: FrameIndex) -> RenderqResult<usize> {
    let mut copied = 0usize;
    for curve in &mut action.fcurves {
        if let Some(value) = curve.key_at(from).map(|k| k.value) {
            curve.insert(to, value);
            copied += 1;
        }
    }
    if copied == 0 {
        return Err(RenderqError::keyframe(format!(
            "no keyframe at frame {from} to copy into frame {to}"
        )));
    }
    Ok(copied)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;

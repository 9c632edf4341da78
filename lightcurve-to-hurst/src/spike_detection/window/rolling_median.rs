use super::Window;
use crate::{
    lightcurve::{Real, Timestamp},
    statistics::median,
};
use std::collections::VecDeque;

/// The value of a point together with the median of the window centred on it.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub(crate) struct BaselineStats {
    pub(crate) value: Real,
    pub(crate) median: Real,
}

impl BaselineStats {
    pub(crate) fn residual(&self) -> Real {
        self.value - self.median
    }
}

/// Centred rolling median. For an even width `w` the point reported is the
/// one `w/2` places from the front, so the window for point `i`
/// spans `[i - w/2, i + w/2 - 1]`. Points without a full window are not reported.
#[derive(Clone)]
pub(crate) struct RollingMedian {
    width: usize,
    buffer: VecDeque<(Timestamp, Real)>,
}

impl RollingMedian {
    pub(crate) fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            buffer: VecDeque::with_capacity(width.max(1) + 1),
        }
    }
}

impl Window for RollingMedian {
    type InputType = (Timestamp, Real);
    type OutputType = (Timestamp, BaselineStats);

    fn push(&mut self, value: (Timestamp, Real)) -> bool {
        self.buffer.push_back(value);
        if self.buffer.len() > self.width {
            self.buffer.pop_front();
        }
        self.buffer.len() == self.width
    }

    fn output(&self) -> Option<(Timestamp, BaselineStats)> {
        let (time, value) = *self.buffer.get(self.width / 2)?;
        let values = self.buffer.iter().map(|(_, v)| *v).collect::<Vec<_>>();
        Some((
            time,
            BaselineStats {
                value,
                median: median(&values)?,
            },
        ))
    }
}

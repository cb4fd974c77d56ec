use serde::Deserialize;

/// One cubic record of a piecewise polynomial profile
///
/// Used for lane widths (section-local `s`), lane offsets and elevation
/// (absolute `s`). The value at `s` is `a + b*ds + c*ds^2 + d*ds^3` with
/// `ds = s - s_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CubicPoly {
    #[serde(default, alias = "s", alias = "sOffset")]
    pub s_offset: f64,
    pub a: f64,
    #[serde(default)]
    pub b: f64,
    #[serde(default)]
    pub c: f64,
    #[serde(default)]
    pub d: f64,
}

impl CubicPoly {
    pub fn new(s_offset: f64, a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            s_offset,
            a,
            b,
            c,
            d,
        }
    }

    /// A record with a constant value from `s_offset` on
    pub fn constant(s_offset: f64, a: f64) -> Self {
        Self::new(s_offset, a, 0.0, 0.0, 0.0)
    }

    /// Evaluate this record at `s`, no matter whether `s` lies in its domain
    pub fn eval(&self, s: f64) -> f64 {
        let ds = s - self.s_offset;
        self.a + ds * (self.b + ds * (self.c + ds * self.d))
    }

    /// True when every coefficient is zero
    pub fn is_zero(&self) -> bool {
        self.a == 0.0 && self.b == 0.0 && self.c == 0.0 && self.d == 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.s_offset.is_finite()
            && self.a.is_finite()
            && self.b.is_finite()
            && self.c.is_finite()
            && self.d.is_finite()
    }
}

/// Evaluate a piecewise cubic profile at `s`
///
/// Picks the record with the greatest `s_offset <= s`, or the first record when
/// `s` precedes all of them. An empty profile evaluates to zero.
///
/// Records must be sorted ascending by `s_offset`.
pub fn eval_piecewise(records: &[CubicPoly], s: f64) -> f64 {
    let Some(first) = records.first() else {
        return 0.0;
    };

    let idx = records.partition_point(|r| r.s_offset <= s);
    let record = if idx == 0 { first } else { &records[idx - 1] };
    record.eval(s)
}

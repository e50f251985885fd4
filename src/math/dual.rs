use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub};

/// Number of calibrated parameters carried in every tangent.
pub const N_PARAMS: usize = 3;

/// Tangent slot of each calibrated parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamIndex {
    InitialInfectionRate = 0,
    MortalityRate = 1,
    R0 = 2,
}

/// Forward-mode dual number: a value plus its partial derivatives with respect to
/// the calibrated parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual {
    pub re: f64,
    pub eps: [f64; N_PARAMS],
}

impl Dual {
    pub const ZERO: Dual = Dual { re: 0.0, eps: [0.0; N_PARAMS] };
    pub const ONE: Dual = Dual { re: 1.0, eps: [0.0; N_PARAMS] };

    pub fn constant(re: f64) -> Self {
        Self { re, eps: [0.0; N_PARAMS] }
    }

    /// A seeded input: unit tangent in the slot of `param`.
    pub fn variable(re: f64, param: ParamIndex) -> Self {
        let mut eps = [0.0; N_PARAMS];
        eps[param as usize] = 1.0;
        Self { re, eps }
    }

    /// Stop-gradient: same value, no tangent.
    pub fn detach(self) -> Self {
        Self::constant(self.re)
    }

    /// Straight-through value: reports `hard` forward, carries the tangent of `soft`.
    ///
    /// Equivalent to `soft + detach(hard - soft)` without the rounding that form
    /// introduces in the value.
    pub fn straight_through(hard: f64, soft: Dual) -> Self {
        Self { re: hard, eps: soft.eps }
    }

    pub fn grad(&self, param: ParamIndex) -> f64 {
        self.eps[param as usize]
    }

    fn chain(self, re: f64, d: f64) -> Self {
        let mut eps = self.eps;
        for e in eps.iter_mut() {
            *e *= d;
        }
        Self { re, eps }
    }

    pub fn ln(self) -> Self {
        self.chain(self.re.ln(), 1.0 / self.re)
    }

    pub fn exp(self) -> Self {
        let v = self.re.exp();
        self.chain(v, v)
    }

    pub fn recip(self) -> Self {
        self.chain(1.0 / self.re, -1.0 / (self.re * self.re))
    }

    pub fn scale(self, k: f64) -> Self {
        self.chain(self.re * k, k)
    }
}

impl Default for Dual {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<f64> for Dual {
    fn from(re: f64) -> Self {
        Self::constant(re)
    }
}

impl Add for Dual {
    type Output = Dual;
    fn add(self, rhs: Dual) -> Dual {
        let mut eps = self.eps;
        for (e, r) in eps.iter_mut().zip(rhs.eps) {
            *e += r;
        }
        Dual { re: self.re + rhs.re, eps }
    }
}

impl Sub for Dual {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Dual {
        self + (-rhs)
    }
}

impl Neg for Dual {
    type Output = Dual;
    fn neg(self) -> Dual {
        self.scale(-1.0)
    }
}

impl Mul for Dual {
    type Output = Dual;
    fn mul(self, rhs: Dual) -> Dual {
        let mut eps = [0.0; N_PARAMS];
        for (i, e) in eps.iter_mut().enumerate() {
            *e = self.eps[i] * rhs.re + self.re * rhs.eps[i];
        }
        Dual { re: self.re * rhs.re, eps }
    }
}

impl Div for Dual {
    type Output = Dual;
    fn div(self, rhs: Dual) -> Dual {
        self * rhs.recip()
    }
}

impl Add<f64> for Dual {
    type Output = Dual;
    fn add(self, rhs: f64) -> Dual {
        Dual { re: self.re + rhs, eps: self.eps }
    }
}

impl Sub<f64> for Dual {
    type Output = Dual;
    fn sub(self, rhs: f64) -> Dual {
        Dual { re: self.re - rhs, eps: self.eps }
    }
}

impl Sub<Dual> for f64 {
    type Output = Dual;
    fn sub(self, rhs: Dual) -> Dual {
        (-rhs) + self
    }
}

impl Mul<f64> for Dual {
    type Output = Dual;
    fn mul(self, rhs: f64) -> Dual {
        self.scale(rhs)
    }
}

impl Div<f64> for Dual {
    type Output = Dual;
    fn div(self, rhs: f64) -> Dual {
        self.scale(1.0 / rhs)
    }
}

impl AddAssign for Dual {
    fn add_assign(&mut self, rhs: Dual) {
        *self = *self + rhs;
    }
}

impl MulAssign for Dual {
    fn mul_assign(&mut self, rhs: Dual) {
        *self = *self * rhs;
    }
}

impl Sum for Dual {
    fn sum<I: Iterator<Item = Dual>>(iter: I) -> Dual {
        iter.fold(Dual::ZERO, |acc, x| acc + x)
    }
}

//! `f64` math wrappers so the rest of the crate reads the same whether it
//! is compiled against `std` or bare `libm` in a `no_std` build.

#[cfg(feature = "std")]
pub fn sin(x: f64) -> f64 {
    x.sin()
}
#[cfg(not(feature = "std"))]
pub fn sin(x: f64) -> f64 {
    libm::sin(x)
}

#[cfg(feature = "std")]
pub fn cos(x: f64) -> f64 {
    x.cos()
}
#[cfg(not(feature = "std"))]
pub fn cos(x: f64) -> f64 {
    libm::cos(x)
}

#[cfg(feature = "std")]
pub fn atan(x: f64) -> f64 {
    x.atan()
}
#[cfg(not(feature = "std"))]
pub fn atan(x: f64) -> f64 {
    libm::atan(x)
}

#[cfg(feature = "std")]
pub fn hypot(x: f64, y: f64) -> f64 {
    x.hypot(y)
}
#[cfg(not(feature = "std"))]
pub fn hypot(x: f64, y: f64) -> f64 {
    libm::hypot(x, y)
}

#[cfg(feature = "std")]
pub fn sqrt(x: f64) -> f64 {
    x.sqrt()
}
#[cfg(not(feature = "std"))]
pub fn sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

#[cfg(feature = "std")]
pub fn ceil(x: f64) -> f64 {
    x.ceil()
}
#[cfg(not(feature = "std"))]
pub fn ceil(x: f64) -> f64 {
    libm::ceil(x)
}

pub fn abs(x: f64) -> f64 {
    if x < 0.0 {
        -x
    } else {
        x
    }
}

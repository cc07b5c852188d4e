//! Request Builder: raw form values in, a bounded request URL out.
//!
//! Everything here is pure. The only rejection is empty text; every numeric
//! field is coerced and clamped instead of rejected.

use std::fmt;
use std::ops::RangeInclusive;

use url::Url;

use crate::error::QrError;
use crate::qr_input::QrInput;

pub const DEFAULT_SIZE: u32 = 300;
pub const DEFAULT_MARGIN: u32 = 2;
pub const SIZE_RANGE: RangeInclusive<u32> = 100..=2000;
pub const MARGIN_RANGE: RangeInclusive<u32> = 0..=10;

/// QR error-correction level, passed to the service unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EccLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

impl EccLevel {
    pub const ALL: [Self; 4] = [Self::L, Self::M, Self::Q, Self::H];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }

    /// Selector label with the recoverable share of the symbol.
    pub fn label(self) -> &'static str {
        match self {
            Self::L => "L (7%)",
            Self::M => "M (15%)",
            Self::Q => "Q (25%)",
            Self::H => "H (30%)",
        }
    }

    /// Case-insensitive; anything unrecognized is `M`.
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "L" => Self::L,
            "M" => Self::M,
            "Q" => Self::Q,
            "H" => Self::H,
            _ => Self::default(),
        }
    }
}

impl fmt::Display for EccLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, bounded parameters of one Generate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub text: String,
    pub size_pixels: u32,
    pub margin_units: u32,
    pub ecc: EccLevel,
}

impl GenerationRequest {
    /// `None` for a numeric field means the field was missing.
    pub fn from_raw(
        text: &str,
        size: Option<&str>,
        margin: Option<&str>,
        ecc: Option<&str>,
    ) -> Result<Self, QrError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(QrError::EmptyInput);
        }

        Ok(Self {
            text: text.to_owned(),
            size_pixels: coerce_bounded(size, DEFAULT_SIZE, &SIZE_RANGE),
            margin_units: coerce_bounded(margin, DEFAULT_MARGIN, &MARGIN_RANGE),
            ecc: ecc.map(EccLevel::parse_or_default).unwrap_or_default(),
        })
    }

    pub fn from_input(input: &QrInput) -> Result<Self, QrError> {
        Self::from_raw(
            &input.text,
            Some(&input.size),
            Some(&input.margin),
            Some(input.ecc.as_str()),
        )
    }
}

/// Trim, parse as a float, truncate toward zero, clamp.
///
/// Missing, empty and non-numeric input (`NaN` included) use `default`.
/// Infinities saturate at the bounds.
pub fn coerce_bounded(raw: Option<&str>, default: u32, range: &RangeInclusive<u32>) -> u32 {
    let parsed = raw
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|value| !value.is_nan());

    match parsed {
        Some(value) => {
            let (min, max) = (f64::from(*range.start()), f64::from(*range.end()));
            // In range after the clamp, so the cast is exact.
            value.trunc().clamp(min, max) as u32
        }
        None => default.clamp(*range.start(), *range.end()),
    }
}

/// The fully-qualified URL requested for one [`GenerationRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    url: Url,
}

impl RequestDescriptor {
    /// Appends `size`, `data`, `ecc`, `margin` in that order, form-encoded.
    pub fn new(endpoint: &str, request: &GenerationRequest) -> Result<Self, QrError> {
        let mut url = Url::parse(endpoint).map_err(|err| QrError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: err.to_string(),
        })?;

        let size = format!("{0}x{0}", request.size_pixels);
        url.query_pairs_mut()
            .append_pair("size", &size)
            .append_pair("data", &request.text)
            .append_pair("ecc", request.ecc.as_str())
            .append_pair("margin", &request.margin_units.to_string());

        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn query(&self) -> &str {
        self.url.query().unwrap_or_default()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form input to descriptor. `EmptyInput` means no request may be issued.
pub fn build(endpoint: &str, input: &QrInput) -> Result<RequestDescriptor, QrError> {
    let request = GenerationRequest::from_input(input)?;
    RequestDescriptor::new(endpoint, &request)
}

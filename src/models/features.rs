use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

pub const FEATURE_COUNT: usize = 10;

/// Model input slots, in the order the scaler and model were fitted on.
///
/// Every producer and consumer of feature values indexes through this enum,
/// so changing the order here changes it everywhere at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum Feature {
    Open = 0,
    High = 1,
    Low = 2,
    Volume = 3,
    Year = 4,
    Month = 5,
    Day = 6,
    DayOfWeek = 7,
    CloseLag1 = 8,
    Ma7 = 9,
}

impl Feature {
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Open,
        Feature::High,
        Feature::Low,
        Feature::Volume,
        Feature::Year,
        Feature::Month,
        Feature::Day,
        Feature::DayOfWeek,
        Feature::CloseLag1,
        Feature::Ma7,
    ];

    /// Column name used by the training side.
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Open => "Open",
            Feature::High => "High",
            Feature::Low => "Low",
            Feature::Volume => "Volume",
            Feature::Year => "Year",
            Feature::Month => "Month",
            Feature::Day => "Day",
            Feature::DayOfWeek => "DayOfWeek",
            Feature::CloseLag1 => "Close_Lag1",
            Feature::Ma7 => "MA7",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.name()).collect()
    }
}

/// Raw, unscaled model input for a single request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub(crate) fn from_fn(mut value_of: impl FnMut(Feature) -> f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for feature in Feature::ALL {
            values[feature.index()] = value_of(feature);
        }
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn iter_named(&self) -> impl Iterator<Item = (Feature, f64)> + '_ {
        Feature::ALL.iter().map(move |f| (*f, self.get(*f)))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (feature, value) in self.iter_named() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    mem::size_of,
};

use hashbrown::{HashMap, HashSet};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<Option<String>>),
    Categorical {
        levels: Vec<String>,
        codes: Vec<Option<u32>>,
    },
    Int64(Vec<Option<i64>>),
    Int32(Vec<Option<i32>>),
    Float64(Vec<Option<f64>>),
    Float32(Vec<Option<f32>>),
    Boolean(Vec<Option<bool>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Categorical,
    Int64,
    Int32,
    Float64,
    Float32,
    Boolean,
}

//integral floats become Int so keys survive narrowing, NaN is Null
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Null,
    Bool(bool),
    Int(i64),
    Float(FloatKey),
    Text(String),
}

#[derive(Debug, Clone, Copy)]
pub struct FloatKey(pub f64);

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatKey {}

impl Hash for FloatKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl GroupKey {
    pub fn from_float(v: f64) -> Self {
        if v.is_nan() {
            GroupKey::Null
        } else if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
            GroupKey::Int(v as i64)
        } else {
            GroupKey::Float(FloatKey(v))
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, GroupKey::Null)
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Null => Ok(()),
            GroupKey::Bool(b) => write!(f, "{}", b),
            GroupKey::Int(i) => write!(f, "{}", i),
            GroupKey::Float(v) => write!(f, "{}", v.0),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Null => serializer.serialize_none(),
            GroupKey::Bool(b) => serializer.serialize_bool(*b),
            GroupKey::Int(i) => serializer.serialize_i64(*i),
            GroupKey::Float(v) => serializer.serialize_f64(v.0),
            GroupKey::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::Text(value.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        GroupKey::Int(value)
    }
}

macro_rules! take_impl {
    ($self:ident, $idx:ident, $($var:ident),*) => {
        match $self {
            $(Column::$var(v) => Column::$var($idx.iter().map(|i| v[*i].clone()).collect()),)*
            Column::Categorical { levels, codes } => Column::Categorical {
                levels: levels.clone(),
                codes: $idx.iter().map(|i| codes[*i]).collect(),
            },
        }
    };
}

macro_rules! len_impl {
    ($self:ident, $($var:ident),*) => {
        match $self {
            $(Column::$var(v) => v.len(),)*
            Column::Categorical { codes, .. } => codes.len(),
        }
    };
}

impl Column {
    pub fn len(&self) -> usize {
        len_impl!(self, Text, Int64, Int32, Float64, Float32, Boolean)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Text(_) => ColumnKind::Text,
            Column::Categorical { .. } => ColumnKind::Categorical,
            Column::Int64(_) => ColumnKind::Int64,
            Column::Int32(_) => ColumnKind::Int32,
            Column::Float64(_) => ColumnKind::Float64,
            Column::Float32(_) => ColumnKind::Float32,
            Column::Boolean(_) => ColumnKind::Boolean,
        }
    }

    pub fn key(&self, i: usize) -> GroupKey {
        match self {
            Column::Text(v) => match &v[i] {
                Some(s) => GroupKey::Text(s.clone()),
                None => GroupKey::Null,
            },
            Column::Categorical { levels, codes } => match codes[i] {
                Some(c) => GroupKey::Text(levels[c as usize].clone()),
                None => GroupKey::Null,
            },
            Column::Int64(v) => v[i].map_or(GroupKey::Null, GroupKey::Int),
            Column::Int32(v) => v[i].map_or(GroupKey::Null, |x| GroupKey::Int(x.into())),
            Column::Float64(v) => v[i].map_or(GroupKey::Null, GroupKey::from_float),
            Column::Float32(v) => v[i].map_or(GroupKey::Null, |x| GroupKey::from_float(x.into())),
            Column::Boolean(v) => v[i].map_or(GroupKey::Null, GroupKey::Bool),
        }
    }

    //flag reading: nulls and non-flag kinds are false
    pub fn truthy(&self, i: usize) -> bool {
        match self {
            Column::Boolean(v) => v[i].unwrap_or(false),
            Column::Int64(v) => v[i].map_or(false, |x| x != 0),
            Column::Int32(v) => v[i].map_or(false, |x| x != 0),
            Column::Float64(v) => v[i].map_or(false, |x| x != 0.0 && !x.is_nan()),
            Column::Float32(v) => v[i].map_or(false, |x| x != 0.0 && !x.is_nan()),
            _ => false,
        }
    }

    pub fn take(&self, idx: &[usize]) -> Column {
        take_impl!(self, idx, Text, Int64, Int32, Float64, Float32, Boolean)
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|i| self.key(*i).is_null()).count()
    }

    pub fn unique(&self) -> Vec<GroupKey> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for i in 0..self.len() {
            let k = self.key(i);
            if !k.is_null() && seen.insert(k.clone()) {
                out.push(k);
            }
        }
        out
    }

    pub fn distinct_count(&self) -> usize {
        match self {
            Column::Text(v) => v.iter().flatten().collect::<HashSet<&String>>().len(),
            Column::Categorical { codes, .. } => codes.iter().flatten().collect::<HashSet<_>>().len(),
            _ => self.unique().len(),
        }
    }

    pub fn estimated_bytes(&self) -> usize {
        match self {
            Column::Text(v) => v
                .iter()
                .map(|s| size_of::<Option<String>>() + s.as_ref().map_or(0, |s| s.len()))
                .sum(),
            Column::Categorical { levels, codes } => {
                levels.iter().map(|l| size_of::<String>() + l.len()).sum::<usize>()
                    + codes.len() * size_of::<Option<u32>>()
            }
            Column::Int64(v) => v.len() * size_of::<Option<i64>>(),
            Column::Int32(v) => v.len() * size_of::<Option<i32>>(),
            Column::Float64(v) => v.len() * size_of::<Option<f64>>(),
            Column::Float32(v) => v.len() * size_of::<Option<f32>>(),
            Column::Boolean(v) => v.len() * size_of::<Option<bool>>(),
        }
    }

    pub fn categorical_from<I>(values: I) -> Column
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut level_map: HashMap<String, u32> = HashMap::new();
        let mut levels = Vec::new();
        let codes = values
            .into_iter()
            .map(|v| {
                v.map(|s| {
                    *level_map.entry(s).or_insert_with_key(|k| {
                        levels.push(k.clone());
                        (levels.len() - 1) as u32
                    })
                })
            })
            .collect();
        Column::Categorical { levels, codes }
    }
}

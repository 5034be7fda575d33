//! Config fallback resolver: fills omitted request fields from defaults.

use crate::request::HookRequest;
use crate::size::ByteSize;

/// Default values taken from the persisted configuration snapshot.
///
/// A `None` here means the configuration has no default for that field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookDefaults {
    pub red_user_id: Option<i64>,
    pub ops_user_id: Option<i64>,
    pub red_apikey: Option<String>,
    pub ops_apikey: Option<String>,
    pub minratio: Option<f64>,
    pub minsize: Option<ByteSize>,
    pub maxsize: Option<ByteSize>,
    pub uploaders: Option<String>,
    pub mode: Option<String>,
    pub record_labels: Option<String>,
}

impl HookDefaults {
    /// Fill every field the caller omitted. Supplied fields, including
    /// explicit zero or empty values, are never overwritten.
    pub fn apply(&self, req: &mut HookRequest) {
        fill(&mut req.red_user_id, &self.red_user_id);
        fill(&mut req.ops_user_id, &self.ops_user_id);
        fill(&mut req.red_apikey, &self.red_apikey);
        fill(&mut req.ops_apikey, &self.ops_apikey);
        fill(&mut req.minratio, &self.minratio);
        fill(&mut req.minsize, &self.minsize);
        fill(&mut req.maxsize, &self.maxsize);
        fill(&mut req.uploaders, &self.uploaders);
        fill(&mut req.mode, &self.mode);
        fill(&mut req.record_labels, &self.record_labels);
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
    if slot.is_none() {
        *slot = default.clone();
    }
}

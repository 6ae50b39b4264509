use delegate_foundation::source::DeviceQuery;
use delegate_kernel::feature_level::FeatureLevel;
use delegate_kernel::{DeviceKind, DeviceSource, SourceError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// One query a [`MockDeviceSource`] answered (or refused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRecord {
    pub query: DeviceQuery,
    /// Device index; `None` for the count query
    pub index: Option<u32>,
}

#[derive(Debug, Clone)]
struct MockDevice {
    name: String,
    kind_code: i32,
    feature_level: FeatureLevel,
}

/// A device source simulating an accelerator enumeration API
///
/// Devices report their type as a raw API code so unusual codes can be
/// exercised. Scripted failures carry a caller-chosen status code, and
/// every query is recorded for later assertions.
#[derive(Debug, Clone)]
pub struct MockDeviceSource {
    runtime_level: FeatureLevel,
    devices: Vec<MockDevice>,
    failures: HashMap<(DeviceQuery, Option<u32>), SourceError>,
    /// Track all queries made against this source
    pub call_history: Arc<Mutex<Vec<QueryRecord>>>,
}

impl MockDeviceSource {
    pub fn new(runtime_level: FeatureLevel) -> Self {
        Self {
            runtime_level,
            devices: Vec::new(),
            failures: HashMap::new(),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_device(self, name: &str, kind: DeviceKind, feature_level: FeatureLevel) -> Self {
        self.with_raw_device(name, kind.as_raw(), feature_level)
    }

    /// Add a device whose type is reported as `kind_code` verbatim
    pub fn with_raw_device(mut self, name: &str, kind_code: i32, feature_level: FeatureLevel) -> Self {
        self.devices.push(MockDevice {
            name: name.to_string(),
            kind_code,
            feature_level,
        });
        self
    }

    /// Fail `query` for the device at `index` with the given status
    pub fn fail(mut self, query: DeviceQuery, index: u32, code: i32, message: &str) -> Self {
        let key = match query {
            DeviceQuery::Count => (query, None),
            _ => (query, Some(index)),
        };
        self.failures.insert(key, SourceError::new(code, message));
        self
    }

    /// Retrieve the history of queries made to this source
    pub fn history(&self) -> Vec<QueryRecord> {
        self.call_history.lock().clone()
    }

    /// Number of recorded queries of the given kind
    pub fn call_count(&self, query: DeviceQuery) -> usize {
        self.call_history
            .lock()
            .iter()
            .filter(|record| record.query == query)
            .count()
    }

    /// Total number of recorded queries
    pub fn total_calls(&self) -> usize {
        self.call_history.lock().len()
    }

    pub fn clear_history(&self) {
        self.call_history.lock().clear();
    }

    fn record(&self, query: DeviceQuery, index: Option<u32>) -> Result<(), SourceError> {
        self.call_history.lock().push(QueryRecord { query, index });
        match self.failures.get(&(query, index)) {
            Some(err) => {
                tracing::debug!(%query, ?index, "mock query failing");
                Err(err.clone())
            }
            None => Ok(()),
        }
    }

    fn device_at(&self, index: u32) -> Result<&MockDevice, SourceError> {
        self.devices
            .get(index as usize)
            .ok_or_else(|| SourceError::new(4, format!("no device at index {index}")))
    }
}

impl DeviceSource for MockDeviceSource {
    type Handle = u32;

    fn runtime_feature_level(&self) -> FeatureLevel {
        self.runtime_level
    }

    fn device_count(&self) -> Result<u32, SourceError> {
        self.record(DeviceQuery::Count, None)?;
        Ok(self.devices.len() as u32)
    }

    fn device(&self, index: u32) -> Result<u32, SourceError> {
        self.record(DeviceQuery::Device, Some(index))?;
        self.device_at(index)?;
        Ok(index)
    }

    fn device_name(&self, handle: &u32) -> Result<String, SourceError> {
        self.record(DeviceQuery::Name, Some(*handle))?;
        Ok(self.device_at(*handle)?.name.clone())
    }

    fn device_kind(&self, handle: &u32) -> Result<DeviceKind, SourceError> {
        self.record(DeviceQuery::Kind, Some(*handle))?;
        Ok(DeviceKind::from_raw(self.device_at(*handle)?.kind_code))
    }

    fn device_feature_level(&self, handle: &u32) -> Result<FeatureLevel, SourceError> {
        self.record(DeviceQuery::FeatureLevel, Some(*handle))?;
        Ok(self.device_at(*handle)?.feature_level)
    }
}

#[macro_export]
macro_rules! assert_queried {
    ($source:expr, $query:expr, $expected_count:expr) => {
        let count = $source.call_count($query);
        assert_eq!(
            count, $expected_count,
            "Expected {} queries of '{}', but {} were made",
            $expected_count, $query, count
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_every_query() {
        let source = MockDeviceSource::new(29).with_device("gpu0", DeviceKind::Gpu, 29);
        let device = source.describe(0).unwrap();
        assert_eq!(device.name, "gpu0");
        assert_eq!(
            source.history(),
            vec![
                QueryRecord { query: DeviceQuery::Device, index: Some(0) },
                QueryRecord { query: DeviceQuery::Name, index: Some(0) },
                QueryRecord { query: DeviceQuery::Kind, index: Some(0) },
                QueryRecord { query: DeviceQuery::FeatureLevel, index: Some(0) },
            ]
        );
        crate::assert_queried!(source, DeviceQuery::Name, 1);
    }

    #[test]
    fn raw_kind_codes_are_mapped() {
        let source = MockDeviceSource::new(29).with_raw_device("weird", 17, 29);
        assert_eq!(source.describe(0).unwrap().kind, DeviceKind::Unknown);
    }

    #[test]
    fn scripted_failure_keeps_its_code() {
        let source = MockDeviceSource::new(29)
            .with_device("gpu0", DeviceKind::Gpu, 29)
            .fail(DeviceQuery::Device, 0, 6, "unmapped");
        let err = source.device(0).unwrap_err();
        assert_eq!(err.code, 6);
        assert_eq!(err.message, "unmapped");
        assert_eq!(source.total_calls(), 1);
        source.clear_history();
        assert_eq!(source.total_calls(), 0);
    }
}

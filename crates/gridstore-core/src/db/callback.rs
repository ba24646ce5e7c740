use crate::db::entry::EntryInfo;

///
/// IngestCallback
///
/// Invoked once per stored entry, after its rows are written and before
/// statistics observe it.
///

pub trait IngestCallback<T> {
    fn entry_ingested(&mut self, info: &EntryInfo, entry: &T);
}

///
/// ScanCallback
///
/// Invoked once per row a query yields, just before it is handed out.
///

pub trait ScanCallback<T> {
    fn entry_scanned(&mut self, info: &EntryInfo, entry: &T);
}

///
/// NoopCallback
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopCallback;

impl<T> IngestCallback<T> for NoopCallback {
    fn entry_ingested(&mut self, _info: &EntryInfo, _entry: &T) {}
}

impl<T> ScanCallback<T> for NoopCallback {
    fn entry_scanned(&mut self, _info: &EntryInfo, _entry: &T) {}
}

impl<T, F> IngestCallback<T> for F
where
    F: FnMut(&EntryInfo, &T),
{
    fn entry_ingested(&mut self, info: &EntryInfo, entry: &T) {
        self(info, entry);
    }
}

impl<T, F> ScanCallback<T> for F
where
    F: FnMut(&EntryInfo, &T),
{
    fn entry_scanned(&mut self, info: &EntryInfo, entry: &T) {
        self(info, entry);
    }
}

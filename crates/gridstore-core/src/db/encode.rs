//! Module: db::encode
//! Responsibility: turn one domain entry into the rows written for one index.
//! Does not own: storing the rows or statistics bookkeeping.

use crate::{
    db::{
        entry::{EntryInfo, FieldInfo},
        row_id::{DEDUPLICATION_DISABLED, RowId},
    },
    error::InternalError,
    model::{DataAdapter, FieldWriter, Index},
    obs::{MetricsSink, StoreEvent},
    types::Identifier,
    value::PersistentValue,
    visibility::{VisibilityWriter, merge},
};
use tracing::warn;

/// Encode `entry` for `index`.
///
/// An entry that yields no insertion keys is unindexable: a warning is
/// logged and an empty `EntryInfo` is returned. A field with no codec is
/// skipped with a warning. Codec failures are returned to the caller.
pub fn encode_entry<T>(
    adapter: &dyn DataAdapter<T>,
    index: &Index,
    entry: &T,
    visibility_writer: &dyn VisibilityWriter<T>,
    sink: &dyn MetricsSink,
) -> Result<EntryInfo, InternalError> {
    let encoding = adapter.encode(entry, index.model());
    let keys = encoding.insertion_keys(index);

    if keys.is_empty() {
        warn!(
            adapter = %encoding.adapter_id,
            data_id = %encoding.data_id,
            index = %index.id(),
            "entry produced no insertion keys; skipping"
        );
        sink.record(StoreEvent::EntryUnindexable {
            adapter: &encoding.adapter_id,
            data_id: &encoding.data_id,
        });

        return Ok(EntryInfo::empty());
    }

    let duplicate_count = if encoding.deduplication_enabled {
        i32::try_from(keys.len() - 1).unwrap_or(i32::MAX)
    } else {
        DEDUPLICATION_DISABLED
    };

    let rows = keys
        .into_iter()
        .map(|key| {
            let row_id = RowId::new(
                key,
                encoding.data_id.clone(),
                encoding.adapter_id.clone(),
                duplicate_count,
            );
            let raw = row_id.to_raw()?;

            Ok((row_id, raw))
        })
        .collect::<Result<Vec<_>, InternalError>>()?;

    let mut fields = Vec::with_capacity(encoding.common.len() + encoding.extended.len());

    for value in encoding.common.values() {
        let writer = index.model().field_writer(&value.id);
        if let Some(info) = encode_field(writer, value, entry, visibility_writer)? {
            fields.push(info);
        } else {
            skip_field(&encoding.adapter_id, &value.id, sink);
        }
    }

    for value in encoding.extended.values() {
        if value.value.is_null() {
            continue;
        }
        let writer = adapter.field_writer(&value.id);
        if let Some(info) = encode_field(writer, value, entry, visibility_writer)? {
            fields.push(info);
        } else {
            skip_field(&encoding.adapter_id, &value.id, sink);
        }
    }

    Ok(EntryInfo::new(rows, fields))
}

// Write one field and merge its own visibility with the caller's default.
fn encode_field<T>(
    writer: Option<&dyn FieldWriter>,
    value: &PersistentValue,
    entry: &T,
    visibility_writer: &dyn VisibilityWriter<T>,
) -> Result<Option<FieldInfo>, InternalError> {
    let Some(writer) = writer else {
        return Ok(None);
    };

    let written = writer.write_field(&value.value)?;
    let own = writer.visibility(&value.id, &value.value);
    let default = visibility_writer
        .field_visibility_handler(&value.id)
        .visibility(entry, &value.id, &value.value);

    Ok(Some(FieldInfo::new(
        value.clone(),
        written,
        merge(&own, &default),
    )))
}

fn skip_field(adapter: &Identifier, field: &Identifier, sink: &dyn MetricsSink) {
    warn!(%adapter, %field, "no writer for field; skipping");
    sink.record(StoreEvent::FieldSkipped { adapter, field });
}

///
/// TESTS
///

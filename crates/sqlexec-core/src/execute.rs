//! Result of one successful statement execution.

use arrow::datatypes::{DataType, Field, SchemaRef};

use crate::cursor::ResultCursor;
use crate::handle::CommandHandle;

/// Server-side state of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Initialized,
    Pending,
    Running,
    Finished,
    Canceled,
    Closed,
    Error,
    TimedOut,
    Unknown,
}

impl ExecutionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExecutionStatus::Initialized => "initialized",
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Finished => "finished",
            ExecutionStatus::Canceled => "canceled",
            ExecutionStatus::Closed => "closed",
            ExecutionStatus::Error => "error",
            ExecutionStatus::TimedOut => "timed_out",
            ExecutionStatus::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "initialized" => ExecutionStatus::Initialized,
            "pending" => ExecutionStatus::Pending,
            "running" => ExecutionStatus::Running,
            "finished" => ExecutionStatus::Finished,
            "canceled" | "cancelled" => ExecutionStatus::Canceled,
            "closed" => ExecutionStatus::Closed,
            "error" => ExecutionStatus::Error,
            "timed_out" | "timedout" => ExecutionStatus::TimedOut,
            _ => ExecutionStatus::Unknown,
        }
    }

    /// No further state changes are expected from the server.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Finished
                | ExecutionStatus::Canceled
                | ExecutionStatus::Closed
                | ExecutionStatus::Error
                | ExecutionStatus::TimedOut
        )
    }
}

/// Metadata of one result column, in DB-API `description` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: String,
    pub type_code: String,
    pub display_size: Option<u32>,
    pub internal_size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<i8>,
    pub null_ok: bool,
}

fn type_code(dt: &DataType) -> String {
    let code = match dt {
        DataType::Null => "null",
        DataType::Boolean => "boolean",
        DataType::Int8 => "tinyint",
        DataType::Int16 => "smallint",
        DataType::Int32 => "int",
        DataType::Int64 => "bigint",
        DataType::Float32 => "float",
        DataType::Float64 => "double",
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => "string",
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => "binary",
        DataType::Date32 | DataType::Date64 => "date",
        DataType::Timestamp(_, _) => "timestamp",
        DataType::Decimal128(_, _) | DataType::Decimal256(_, _) => "decimal",
        DataType::List(_) | DataType::LargeList(_) | DataType::FixedSizeList(_, _) => "array",
        DataType::Map(_, _) => "map",
        DataType::Struct(_) => "struct",
        other => return other.to_string().to_lowercase(),
    };
    code.to_string()
}

impl ColumnDescription {
    pub fn from_field(field: &Field) -> Self {
        let (precision, scale) = match field.data_type() {
            DataType::Decimal128(p, s) | DataType::Decimal256(p, s) => (Some(*p), Some(*s)),
            _ => (None, None),
        };
        Self {
            name: field.name().clone(),
            type_code: type_code(field.data_type()),
            display_size: None,
            internal_size: None,
            precision,
            scale,
            null_ok: field.is_nullable(),
        }
    }
}

/// Column descriptions for every field of `schema`, in order.
pub fn describe_schema(schema: &SchemaRef) -> Vec<ColumnDescription> {
    schema
        .fields()
        .iter()
        .map(|f| ColumnDescription::from_field(f))
        .collect()
}

/// Everything a successful execution hands back: server status, result
/// metadata, the command handle for follow-up calls, and the first batch of
/// rows (if any) behind a cursor.
#[derive(Debug)]
pub struct ExecutionResult {
    status: ExecutionStatus,
    closed_server_side: bool,
    has_more_rows: bool,
    description: Vec<ColumnDescription>,
    command_handle: CommandHandle,
    cursor: Option<ResultCursor>,
    schema: Option<SchemaRef>,
}

impl ExecutionResult {
    pub fn new(status: ExecutionStatus, command_handle: CommandHandle) -> Self {
        Self {
            status,
            closed_server_side: false,
            has_more_rows: false,
            description: Vec::new(),
            command_handle,
            cursor: None,
            schema: None,
        }
    }

    /// Set the result schema; the column description is derived from it.
    pub fn with_schema(mut self, schema: SchemaRef) -> Self {
        self.description = describe_schema(&schema);
        self.schema = Some(schema);
        self
    }

    /// Attach the first fetched batch. Its schema is adopted when none was set.
    pub fn with_cursor(mut self, cursor: ResultCursor) -> Self {
        if self.schema.is_none() {
            self = self.with_schema(cursor.schema());
        }
        self.cursor = Some(cursor);
        self
    }

    pub fn with_has_more_rows(mut self, has_more_rows: bool) -> Self {
        self.has_more_rows = has_more_rows;
        self
    }

    pub fn closed_server_side(mut self, closed: bool) -> Self {
        self.closed_server_side = closed;
        self
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_closed_server_side(&self) -> bool {
        self.closed_server_side
    }

    /// More rows exist on the server beyond this result's cursor.
    pub fn has_more_rows(&self) -> bool {
        self.has_more_rows
    }

    pub fn description(&self) -> &[ColumnDescription] {
        &self.description
    }

    pub fn command_handle(&self) -> &CommandHandle {
        &self.command_handle
    }

    pub fn schema(&self) -> Option<&SchemaRef> {
        self.schema.as_ref()
    }

    pub fn cursor(&self) -> Option<&ResultCursor> {
        self.cursor.as_ref()
    }

    pub fn cursor_mut(&mut self) -> Option<&mut ResultCursor> {
        self.cursor.as_mut()
    }

    pub fn into_cursor(self) -> Option<ResultCursor> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::Guid;
    use arrow::array::{BooleanArray, Decimal128Array};
    use arrow::datatypes::{Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    #[test]
    fn status_roundtrip_and_unknown() {
        for s in [
            ExecutionStatus::Initialized,
            ExecutionStatus::Pending,
            ExecutionStatus::Running,
            ExecutionStatus::Finished,
            ExecutionStatus::Canceled,
            ExecutionStatus::Closed,
            ExecutionStatus::Error,
            ExecutionStatus::TimedOut,
        ] {
            assert_eq!(ExecutionStatus::parse(s.as_str()), s);
        }
        assert_eq!(ExecutionStatus::parse("FINISHED"), ExecutionStatus::Finished);
        assert_eq!(ExecutionStatus::parse("bogus"), ExecutionStatus::Unknown);
        assert!(ExecutionStatus::Finished.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[test]
    fn describe_common_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("id", DataType::Int64, false),
            Field::new("price", DataType::Decimal128(10, 2), true),
            Field::new("ts", DataType::Timestamp(TimeUnit::Microsecond, None), true),
            Field::new("tags", DataType::new_list(DataType::Utf8, true), true),
        ]));
        let d = describe_schema(&schema);
        assert_eq!(d.len(), 4);
        assert_eq!(d[0].name, "id");
        assert_eq!(d[0].type_code, "bigint");
        assert!(!d[0].null_ok);
        assert_eq!(d[1].type_code, "decimal");
        assert_eq!((d[1].precision, d[1].scale), (Some(10), Some(2)));
        assert_eq!(d[2].type_code, "timestamp");
        assert_eq!(d[3].type_code, "array");
    }

    #[test]
    fn cursor_schema_is_adopted() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("ok", DataType::Boolean, false),
            Field::new("amount", DataType::Decimal128(18, 0), true),
        ]));
        let amounts = Decimal128Array::from(vec![Some(1), None])
            .with_precision_and_scale(18, 0)
            .unwrap();
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(BooleanArray::from(vec![true, false])),
                Arc::new(amounts),
            ],
        )
        .unwrap();

        let handle = CommandHandle::new(Guid::random(), true);
        let mut result = ExecutionResult::new(ExecutionStatus::Finished, handle.clone())
            .with_cursor(ResultCursor::from_batch(batch))
            .with_has_more_rows(true);

        assert_eq!(result.schema(), Some(&schema));
        assert_eq!(result.description().len(), 2);
        assert_eq!(result.command_handle(), &handle);
        assert!(result.has_more_rows());
        assert!(!result.is_closed_server_side());
        let rows = result.cursor_mut().unwrap().next_rows(10);
        assert_eq!(rows.num_rows(), 2);
        assert!(result.into_cursor().unwrap().is_exhausted());
    }

    #[test]
    fn result_without_rows() {
        let result = ExecutionResult::new(
            ExecutionStatus::Finished,
            CommandHandle::new(Guid::random(), false),
        )
        .closed_server_side(true);
        assert!(result.cursor().is_none());
        assert!(result.schema().is_none());
        assert!(result.description().is_empty());
        assert!(result.is_closed_server_side());
    }
}

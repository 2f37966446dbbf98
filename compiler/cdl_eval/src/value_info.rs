use cdl_ir::{static_assert_size, ValueKind};

/// Descriptor of a value sitting on the evaluation stack.
///
/// `offset` is the byte offset of the value's slot in the arena. Object and
/// string values occupy a 4-byte slot holding their object-table index.
/// `Void` values occupy nothing and carry offset `-1`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueInfo {
    pub kind: ValueKind,
    pub offset: i32,
}

static_assert_size!(ValueInfo, 8);

impl ValueInfo {
    pub const VOID: ValueInfo = ValueInfo {
        kind: ValueKind::Void,
        offset: -1,
    };

    pub const fn new(kind: ValueKind, offset: i32) -> Self {
        ValueInfo { kind, offset }
    }

    pub const fn is_void(self) -> bool {
        matches!(self.kind, ValueKind::Void)
    }
}

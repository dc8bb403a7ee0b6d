use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const TYPE_NOT_ASSIGNABLE_TO_TYPE: u32 = 2322;
    pub const TYPES_OF_PROPERTY_INCOMPATIBLE: u32 = 2326;
    pub const PROPERTY_MISSING_IN_TYPE: u32 = 2741;
    pub const TYPE_INSTANTIATION_EXCESSIVELY_DEEP: u32 = 2589;
    pub const INFER_TYPE_NOT_INFERRED: u32 = 90_101;
}

pub mod diagnostic_messages {
    pub const TYPE_NOT_ASSIGNABLE: &str = "Type '{0}' is not assignable to type '{1}'.";
    pub const TYPES_OF_PROPERTY_INCOMPATIBLE: &str = "Types of property '{0}' are incompatible.";
    pub const PROPERTY_MISSING_BUT_REQUIRED: &str =
        "Property '{0}' is missing in type '{1}' but required in type '{2}'.";
    pub const TYPE_INSTANTIATION_EXCESSIVELY_DEEP: &str =
        "Type instantiation is excessively deep and possibly infinite.";
    pub const INFER_TYPE_NOT_INFERRED: &str =
        "No candidate was found for 'infer {0}'; it resolves to '{1}'.";
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = &[
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_NOT_ASSIGNABLE_TO_TYPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_NOT_ASSIGNABLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPES_OF_PROPERTY_INCOMPATIBLE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPES_OF_PROPERTY_INCOMPATIBLE,
    },
    DiagnosticMessage {
        code: diagnostic_codes::PROPERTY_MISSING_IN_TYPE,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::PROPERTY_MISSING_BUT_REQUIRED,
    },
    DiagnosticMessage {
        code: diagnostic_codes::TYPE_INSTANTIATION_EXCESSIVELY_DEEP,
        category: DiagnosticCategory::Error,
        message: diagnostic_messages::TYPE_INSTANTIATION_EXCESSIVELY_DEEP,
    },
    DiagnosticMessage {
        code: diagnostic_codes::INFER_TYPE_NOT_INFERRED,
        category: DiagnosticCategory::Warning,
        message: diagnostic_messages::INFER_TYPE_NOT_INFERRED,
    },
];

//! Scalar leaf types: the values a statement can bind or read directly.

/// Closed set of scalar kinds recognised by canonical Java name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Char,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Date,
    Time,
    DateTime,
    Instant,
}

/// Date/time leaves that need a conversion wrapper on both sides of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal {
    Date,
    Time,
    Timestamp,
    Instant,
}

/// How a scalar is read back from a statement or row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Getter {
    /// A dedicated getter such as `getString`.
    Named(&'static str),
    /// `getObject(key, Boxed.class)`, keeps SQL NULL as `null`.
    Typed(&'static str),
}

impl ScalarKind {
    pub fn from_canonical(name: &str) -> Option<Self> {
        let kind = match name {
            "java.lang.String" | "String" => Self::Text,
            "char" | "java.lang.Character" | "Character" => Self::Char,
            "boolean" | "java.lang.Boolean" | "Boolean" => Self::Boolean,
            "byte" | "java.lang.Byte" | "Byte" => Self::Byte,
            "short" | "java.lang.Short" | "Short" => Self::Short,
            "int" | "java.lang.Integer" | "Integer" => Self::Int,
            "long" | "java.lang.Long" | "Long" => Self::Long,
            "float" | "java.lang.Float" | "Float" => Self::Float,
            "double" | "java.lang.Double" | "Double" => Self::Double,
            "java.math.BigDecimal" | "BigDecimal" => Self::BigDecimal,
            "java.math.BigInteger" | "BigInteger" => Self::BigInteger,
            "java.time.LocalDate" | "LocalDate" => Self::Date,
            "java.time.LocalTime" | "LocalTime" => Self::Time,
            "java.time.LocalDateTime" | "LocalDateTime" => Self::DateTime,
            "java.time.Instant" | "Instant" => Self::Instant,
            _ => return None,
        };
        Some(kind)
    }

    /// Boxed Java type used for locals.
    pub fn java_type(self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Char => "Character",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Short => "Short",
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::BigDecimal => "BigDecimal",
            Self::BigInteger => "BigInteger",
            Self::Date => "LocalDate",
            Self::Time => "LocalTime",
            Self::DateTime => "LocalDateTime",
            Self::Instant => "Instant",
        }
    }

    /// `java.sql.Types` constant used when registering an output.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Text | Self::Char => "Types.VARCHAR",
            Self::Boolean => "Types.BOOLEAN",
            Self::Byte => "Types.TINYINT",
            Self::Short => "Types.SMALLINT",
            Self::Int => "Types.INTEGER",
            Self::Long => "Types.BIGINT",
            Self::Float => "Types.REAL",
            Self::Double => "Types.DOUBLE",
            Self::BigDecimal | Self::BigInteger => "Types.NUMERIC",
            Self::Date => "Types.DATE",
            Self::Time => "Types.TIME",
            Self::DateTime | Self::Instant => "Types.TIMESTAMP",
        }
    }

    /// Statement setter used for binds.
    pub fn setter(self) -> &'static str {
        match self {
            Self::Text | Self::Char => "setString",
            Self::BigDecimal => "setBigDecimal",
            Self::Date => "setDate",
            Self::Time => "setTime",
            Self::DateTime | Self::Instant => "setTimestamp",
            _ => "setObject",
        }
    }

    pub fn getter(self) -> Getter {
        match self {
            Self::Text | Self::Char => Getter::Named("getString"),
            Self::BigDecimal => Getter::Named("getBigDecimal"),
            Self::Date => Getter::Named("getDate"),
            Self::Time => Getter::Named("getTime"),
            Self::DateTime | Self::Instant => Getter::Named("getTimestamp"),
            other => Getter::Typed(other.java_type()),
        }
    }

    pub fn temporal(self) -> Option<Temporal> {
        match self {
            Self::Date => Some(Temporal::Date),
            Self::Time => Some(Temporal::Time),
            Self::DateTime => Some(Temporal::Timestamp),
            Self::Instant => Some(Temporal::Instant),
            _ => None,
        }
    }
}

impl Temporal {
    /// Helper that converts a `java.time` value into its `java.sql` counterpart.
    pub fn write_fn(self) -> &'static str {
        match self {
            Self::Date => "toSqlDate",
            Self::Time => "toSqlTime",
            Self::Timestamp => "toSqlTimestamp",
            Self::Instant => "toSqlInstant",
        }
    }

    /// Inverse of [`Temporal::write_fn`].
    pub fn read_fn(self) -> &'static str {
        match self {
            Self::Date => "fromSqlDate",
            Self::Time => "fromSqlTime",
            Self::Timestamp => "fromSqlTimestamp",
            Self::Instant => "fromSqlInstant",
        }
    }
}

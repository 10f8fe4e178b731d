//! Semantic types.
//!
//! Equality is structural throughout: a `Reference`'s immutability flag
//! is excluded, and the Nullable relaxation (`T` matches `T?`) lives in
//! [`Type::matches`], not in `==`.

use std::fmt;

use crate::symbol::{Symbol, SymbolArena, SymbolId};

#[derive(Clone, Debug)]
pub enum Type {
    /// A reference to a type symbol (native, struct, or type parameter).
    Base(SymbolId),
    Tuple(Vec<Type>),
    Generic {
        base: Box<Type>,
        args: Vec<Type>,
    },
    Mutable(Box<Type>),
    Array(Box<Type>),
    Nullable(Box<Type>),
    Reference {
        inner: Box<Type>,
        immutable: bool,
    },
    Function {
        params: Vec<Type>,
        return_type: Option<Box<Type>>,
    },
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Base(a), Type::Base(b)) => a == b,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (
                Type::Generic { base: a, args: x },
                Type::Generic { base: b, args: y },
            ) => a == b && x == y,
            (Type::Mutable(a), Type::Mutable(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a == b,
            (Type::Nullable(a), Type::Nullable(b)) => a == b,
            // The immutability flag is excluded from equality.
            (Type::Reference { inner: a, .. }, Type::Reference { inner: b, .. }) => a == b,
            (
                Type::Function {
                    params: p1,
                    return_type: r1,
                },
                Type::Function {
                    params: p2,
                    return_type: r2,
                },
            ) => p1 == p2 && r1 == r2,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Type {
    #[must_use]
    pub fn mutable(inner: Type) -> Type {
        // Mutable may not wrap Mutable.
        match inner {
            Type::Mutable(_) => inner,
            other => Type::Mutable(Box::new(other)),
        }
    }

    #[must_use]
    pub fn array(inner: Type) -> Type {
        Type::Array(Box::new(inner))
    }

    #[must_use]
    pub fn nullable(inner: Type) -> Type {
        match inner {
            Type::Nullable(_) => inner,
            other => Type::Nullable(Box::new(other)),
        }
    }

    #[must_use]
    pub fn reference(inner: Type, immutable: bool) -> Type {
        // A reference wraps at most one level.
        match inner {
            Type::Reference { inner, .. } => Type::Reference { inner, immutable },
            other => Type::Reference {
                inner: Box::new(other),
                immutable,
            },
        }
    }

    /// Equality modulo the Nullable relaxation: a non-Nullable `T`
    /// matches `T?`. Used for overload selection and first-level
    /// assignment/return compatibility; no deeper conversions exist.
    #[must_use]
    pub fn matches(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        match (self, other) {
            (Type::Nullable(inner), other) => inner.as_ref() == other,
            (this, Type::Nullable(inner)) => this == inner.as_ref(),
            _ => false,
        }
    }

    /// The type symbol at the root of this type, looking through
    /// wrappers and generic application.
    #[must_use]
    pub fn root_symbol(&self) -> Option<SymbolId> {
        match self {
            Type::Base(id) => Some(*id),
            Type::Generic { base, .. } => base.root_symbol(),
            Type::Mutable(inner)
            | Type::Array(inner)
            | Type::Nullable(inner) => inner.root_symbol(),
            Type::Reference { inner, .. } => inner.root_symbol(),
            Type::Tuple(_) | Type::Function { .. } => None,
        }
    }

    /// Strip `mutable` and `ref` wrappers down to the value type.
    #[must_use]
    pub fn value_type(&self) -> &Type {
        match self {
            Type::Mutable(inner) => inner.value_type(),
            Type::Reference { inner, .. } => inner.value_type(),
            other => other,
        }
    }

    /// Displayable form; `symbols` supplies type-symbol names.
    #[must_use]
    pub fn display<'a>(&'a self, symbols: &'a SymbolArena) -> TypeDisplay<'a> {
        TypeDisplay { ty: self, symbols }
    }
}

/// Renders a type in source form: `T[]`, `T?`, `mutable T`, `ref T`,
/// `(T1, T2)`, `T[A, B]`, `(P1, P2) => R`.
pub struct TypeDisplay<'a> {
    ty: &'a Type,
    symbols: &'a SymbolArena,
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct List<'a>(&'a [Type], &'a SymbolArena);
        impl fmt::Display for List<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for (i, ty) in self.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", ty.display(self.1))?;
                }
                Ok(())
            }
        }
        match self.ty {
            Type::Base(id) => match self.symbols.get(*id) {
                Symbol::Type(ts) => write!(f, "{}", ts.name),
                other => write!(f, "{}", other.name()),
            },
            Type::Tuple(elements) => write!(f, "({})", List(elements, self.symbols)),
            Type::Generic { base, args } => {
                write!(
                    f,
                    "{}[{}]",
                    base.display(self.symbols),
                    List(args, self.symbols)
                )
            }
            Type::Mutable(inner) => write!(f, "mutable {}", inner.display(self.symbols)),
            Type::Array(inner) => write!(f, "{}[]", inner.display(self.symbols)),
            Type::Nullable(inner) => write!(f, "{}?", inner.display(self.symbols)),
            Type::Reference { inner, .. } => write!(f, "ref {}", inner.display(self.symbols)),
            Type::Function {
                params,
                return_type,
            } => {
                write!(f, "({})", List(params, self.symbols))?;
                match return_type {
                    Some(ret) => write!(f, " => {}", ret.display(self.symbols)),
                    None => write!(f, " => ()"),
                }
            }
        }
    }
}

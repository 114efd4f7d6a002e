use serde::{Deserialize, Serialize};

/// Binary operators of the host language.
///
/// Assignment and indexing are binary nodes too, matching how the host
/// front end represents `limit = 10` inside an argument list and `a[b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Assign,
    PlusAssign,
    MinusAssign,
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    InstanceOf,
    LeftShift,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// `target[index]`
    Index,
}

impl BinaryOp {
    /// Source token for the operator.
    pub fn token(&self) -> &'static str {
        match self {
            BinaryOp::Assign => "=",
            BinaryOp::PlusAssign => "+=",
            BinaryOp::MinusAssign => "-=",
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
            BinaryOp::LeftShift => "<<",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Index => "[",
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(
            self,
            BinaryOp::Assign | BinaryOp::PlusAssign | BinaryOp::MinusAssign
        )
    }

    /// Word operators need surrounding spaces when printed.
    pub fn is_keyword(&self) -> bool {
        matches!(self, BinaryOp::In | BinaryOp::InstanceOf)
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

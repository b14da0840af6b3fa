//! Arena view of a finished AST with parent links.
//!
//! The typed AST owns its children and has no back-references. [`AstTree`]
//! flattens a [`SqlQuery`] into an arena where each node records its kind, its
//! parent as a plain index, and its ordered children, so contextual lookups
//! ("which table is this column under?") never need cyclic pointers.

use serde::Serialize;

use super::expression::{ColumnAssignment, ColumnReference, Condition, SelectColumn, Value};
use super::statement::{
    DeleteClause, InsertClause, JoinClause, NamedQuery, QueryClause, ReturningClause, SelectClause,
    SelectColumns, SqlQuery, TableReference, UpdateClause, WhereClause, WithClause,
};
use crate::schema::Database;

/// Index of a node in an [`AstTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// The kind tag of every AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    SqlQuery,
    WithClause,
    NamedQuery,
    SelectClause,
    InsertClause,
    UpdateClause,
    DeleteClause,
    JoinClause,
    WhereClause,
    ReturningClause,
    Condition,
    TableReference,
    SelectColumn,
    Wildcard,
    UnboundColumnReference,
    TableColumnReference,
    ColumnAssignment,
    ParameterValue,
    StringValue,
    NumericValue,
    BooleanValue,
    NullValue,
}

/// A borrowed AST node.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Query(&'a SqlQuery),
    With(&'a WithClause),
    NamedQuery(&'a NamedQuery),
    Select(&'a SelectClause),
    Insert(&'a InsertClause),
    Update(&'a UpdateClause),
    Delete(&'a DeleteClause),
    Join(&'a JoinClause),
    Where(&'a WhereClause),
    Returning(&'a ReturningClause),
    Condition(&'a Condition),
    Table(&'a TableReference),
    SelectColumn(&'a SelectColumn),
    Wildcard,
    Column(&'a ColumnReference),
    Assignment(&'a ColumnAssignment),
    Value(&'a Value),
}

impl NodeRef<'_> {
    /// The node's kind tag.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Query(_) => NodeKind::SqlQuery,
            Self::With(_) => NodeKind::WithClause,
            Self::NamedQuery(_) => NodeKind::NamedQuery,
            Self::Select(_) => NodeKind::SelectClause,
            Self::Insert(_) => NodeKind::InsertClause,
            Self::Update(_) => NodeKind::UpdateClause,
            Self::Delete(_) => NodeKind::DeleteClause,
            Self::Join(_) => NodeKind::JoinClause,
            Self::Where(_) => NodeKind::WhereClause,
            Self::Returning(_) => NodeKind::ReturningClause,
            Self::Condition(_) => NodeKind::Condition,
            Self::Table(_) => NodeKind::TableReference,
            Self::SelectColumn(_) => NodeKind::SelectColumn,
            Self::Wildcard => NodeKind::Wildcard,
            Self::Column(ColumnReference::Unbound { .. })
            | Self::Value(Value::Column(ColumnReference::Unbound { .. })) => {
                NodeKind::UnboundColumnReference
            }
            Self::Column(ColumnReference::Table { .. })
            | Self::Value(Value::Column(ColumnReference::Table { .. })) => {
                NodeKind::TableColumnReference
            }
            Self::Assignment(_) => NodeKind::ColumnAssignment,
            Self::Value(Value::Parameter(_)) => NodeKind::ParameterValue,
            Self::Value(Value::String(_)) => NodeKind::StringValue,
            Self::Value(Value::Integer(_) | Value::Float(_)) => NodeKind::NumericValue,
            Self::Value(Value::Boolean(_)) => NodeKind::BooleanValue,
            Self::Value(Value::Null) => NodeKind::NullValue,
        }
    }
}

/// One arena slot.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    /// The AST node.
    pub node: NodeRef<'a>,
    /// The enclosing node; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Child nodes in source order.
    pub children: Vec<NodeId>,
}

impl Node<'_> {
    /// The node's kind tag.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.node.kind()
    }
}

/// A flattened, parent-linked view of a [`SqlQuery`].
#[derive(Debug, Clone)]
pub struct AstTree<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> AstTree<'a> {
    /// Flattens a query. The root is always `NodeId` 0.
    #[must_use]
    pub fn new(query: &'a SqlQuery) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let root = tree.push(NodeRef::Query(query), None);
        if let Some(with) = &query.with {
            tree.add_with(with, root);
        }
        tree.add_clause(&query.query, root);
        tree
    }

    /// The root node id.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<'a> {
        &self.nodes[id.0]
    }

    /// The parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    /// The children of a node, in source order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[][..], |n| n.children.as_slice())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates all nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<'a>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Iterates the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Every column reference in the tree, in pre-order.
    pub fn column_references(&self) -> impl Iterator<Item = (NodeId, &'a ColumnReference)> + '_ {
        self.iter().filter_map(|(id, n)| match n.node {
            NodeRef::Column(column) => Some((id, column)),
            _ => None,
        })
    }

    /// The table a node is under.
    ///
    /// A qualified column belongs to the active table whose alias matches the
    /// qualifier. A bare column belongs to the single active table that
    /// declares it, looked up in `db` or in the output columns of a visible
    /// CTE; `None` if no table or more than one does. Inside a JOIN's ON
    /// clause only the FROM table and the joins up to that one are active.
    /// Any other node is under the innermost JOIN, SELECT, INSERT, UPDATE or
    /// DELETE table.
    #[must_use]
    pub fn enclosing_table(&self, id: NodeId, db: &Database) -> Option<&'a TableReference> {
        let column = match self.nodes.get(id.0)?.node {
            NodeRef::Column(column) => Some(column),
            _ => None,
        };

        let mut join: Option<&'a JoinClause> = None;
        for ancestor in self.ancestors(id) {
            let active: Vec<&'a TableReference> = match self.nodes[ancestor.0].node {
                NodeRef::Join(clause) => {
                    join = join.or(Some(clause));
                    continue;
                }
                NodeRef::Select(select) => {
                    let visible = join
                        .and_then(|j| select.joins.iter().position(|s| std::ptr::eq(s, j)))
                        .map_or(select.joins.len(), |k| k + 1);
                    std::iter::once(&select.from)
                        .chain(select.joins[..visible].iter().map(|j| &j.table))
                        .collect()
                }
                NodeRef::Insert(insert) => vec![&insert.table],
                NodeRef::Update(update) => vec![&update.table],
                NodeRef::Delete(delete) => vec![&delete.table],
                _ => continue,
            };

            let Some(column) = column else {
                return join.map(|j| &j.table).or_else(|| active.first().copied());
            };
            return match column.table() {
                Some(qualifier) => active
                    .into_iter()
                    .find(|t| t.scope_name().eq_ignore_ascii_case(qualifier)),
                None => {
                    let ctes = self.visible_ctes(ancestor);
                    let mut declaring = active
                        .into_iter()
                        .filter(|t| declares(t, column.column(), ctes, db));
                    match (declaring.next(), declaring.next()) {
                        (Some(table), None) => Some(table),
                        _ => None,
                    }
                }
            };
        }
        None
    }

    /// CTEs a statement can read: all of them for the main statement, the
    /// earlier ones for a CTE body.
    fn visible_ctes(&self, statement: NodeId) -> &'a [NamedQuery] {
        let ctes: &'a [NamedQuery] = match self.nodes[0].node {
            NodeRef::Query(query) => query.with.as_ref().map_or(&[][..], |w| w.ctes.as_slice()),
            _ => &[],
        };
        let cte = self.parent(statement).and_then(|p| match self.nodes[p.0].node {
            NodeRef::NamedQuery(cte) => ctes.iter().position(|c| std::ptr::eq(c, cte)),
            _ => None,
        });
        cte.map_or(ctes, |k| &ctes[..k])
    }

    fn push(&mut self, node: NodeRef<'a>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    fn add_with(&mut self, with: &'a WithClause, parent: NodeId) {
        let id = self.push(NodeRef::With(with), Some(parent));
        for cte in &with.ctes {
            let cte_id = self.push(NodeRef::NamedQuery(cte), Some(id));
            self.add_select(&cte.query, cte_id);
        }
    }

    fn add_clause(&mut self, clause: &'a QueryClause, parent: NodeId) {
        match clause {
            QueryClause::Select(select) => self.add_select(select, parent),
            QueryClause::Insert(insert) => {
                let id = self.push(NodeRef::Insert(insert), Some(parent));
                self.push(NodeRef::Table(&insert.table), Some(id));
                self.add_assignments(&insert.columns, id);
                self.add_returning(insert.returning.as_ref(), id);
            }
            QueryClause::Update(update) => {
                let id = self.push(NodeRef::Update(update), Some(parent));
                self.push(NodeRef::Table(&update.table), Some(id));
                self.add_assignments(&update.columns, id);
                self.add_where(update.where_clause.as_ref(), id);
                self.add_returning(update.returning.as_ref(), id);
            }
            QueryClause::Delete(delete) => {
                let id = self.push(NodeRef::Delete(delete), Some(parent));
                self.push(NodeRef::Table(&delete.table), Some(id));
                self.add_where(delete.where_clause.as_ref(), id);
                self.add_returning(delete.returning.as_ref(), id);
            }
        }
    }

    fn add_select(&mut self, select: &'a SelectClause, parent: NodeId) {
        let id = self.push(NodeRef::Select(select), Some(parent));
        self.add_columns(&select.columns, id);
        self.push(NodeRef::Table(&select.from), Some(id));
        for join in &select.joins {
            let join_id = self.push(NodeRef::Join(join), Some(id));
            self.push(NodeRef::Table(&join.table), Some(join_id));
            self.add_condition(&join.on, join_id);
        }
        self.add_where(select.where_clause.as_ref(), id);
    }

    fn add_columns(&mut self, columns: &'a SelectColumns, parent: NodeId) {
        match columns {
            SelectColumns::All => {
                self.push(NodeRef::Wildcard, Some(parent));
            }
            SelectColumns::List(list) => {
                for column in list {
                    let id = self.push(NodeRef::SelectColumn(column), Some(parent));
                    self.push(NodeRef::Column(&column.column), Some(id));
                }
            }
        }
    }

    fn add_assignments(&mut self, assignments: &'a [ColumnAssignment], parent: NodeId) {
        for assignment in assignments {
            let id = self.push(NodeRef::Assignment(assignment), Some(parent));
            self.push(NodeRef::Column(&assignment.column), Some(id));
            self.add_value(&assignment.value, id);
        }
    }

    fn add_where(&mut self, where_clause: Option<&'a WhereClause>, parent: NodeId) {
        if let Some(where_clause) = where_clause {
            let id = self.push(NodeRef::Where(where_clause), Some(parent));
            self.add_condition(&where_clause.condition, id);
        }
    }

    fn add_returning(&mut self, returning: Option<&'a ReturningClause>, parent: NodeId) {
        if let Some(returning) = returning {
            let id = self.push(NodeRef::Returning(returning), Some(parent));
            self.add_columns(&returning.columns, id);
        }
    }

    fn add_condition(&mut self, condition: &'a Condition, parent: NodeId) {
        let id = self.push(NodeRef::Condition(condition), Some(parent));
        match condition {
            Condition::Compare { left, right, .. } => {
                self.add_value(left, id);
                self.add_value(right, id);
            }
            Condition::And { left, right } | Condition::Or { left, right } => {
                self.add_condition(left, id);
                self.add_condition(right, id);
            }
        }
    }

    fn add_value(&mut self, value: &'a Value, parent: NodeId) {
        match value {
            Value::Column(column) => self.push(NodeRef::Column(column), Some(parent)),
            other => self.push(NodeRef::Value(other), Some(parent)),
        };
    }
}

/// Whether `table` has a column named `column`. CTE names shadow schema
/// tables.
fn declares(table: &TableReference, column: &str, ctes: &[NamedQuery], db: &Database) -> bool {
    let Some(k) = ctes
        .iter()
        .position(|c| c.alias.eq_ignore_ascii_case(&table.table))
    else {
        return db
            .table(&table.table)
            .is_some_and(|t| t.column(column).is_some());
    };
    let body = &ctes[k].query;
    match &body.columns {
        SelectColumns::List(list) => list
            .iter()
            .any(|c| c.output_name().eq_ignore_ascii_case(column)),
        SelectColumns::All => std::iter::once(&body.from)
            .chain(body.joins.iter().map(|j| &j.table))
            .any(|t| declares(t, column, &ctes[..k], db)),
    }
}

impl SqlQuery {
    /// Builds the parent-linked arena view of this query.
    #[must_use]
    pub fn tree(&self) -> AstTree<'_> {
        AstTree::new(self)
    }
}

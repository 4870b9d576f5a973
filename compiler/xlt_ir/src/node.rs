//! Node payloads.
//!
//! Each concrete node kind has a payload struct; [`NodeData`] is the closed
//! set of them. Payloads own their child slots but never the children
//! themselves: those live in the [`NodeArena`](crate::NodeArena) next to
//! their parent.

use std::fmt;
use std::sync::Arc;

use crate::slot::{BodyDeclaration, ChildLink, ChildList, SlotMut, SlotType, SlotView};
use crate::{NodeId, NodeKind, SlotName};

/// Identity of a declared type: its qualified name (`pkg.Outer.Inner`).
///
/// Stable across units and unit copies, so registries shared by a whole
/// translation run key on it.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TypeIdentity(Arc<str>);

impl TypeIdentity {
    pub fn new(qualified_name: impl Into<Arc<str>>) -> Self {
        TypeIdentity(qualified_name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment of the qualified name.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIdentity({})", self.0)
    }
}

impl fmt::Display for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payload of the compilation-unit root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UnitNode {
    pub(crate) package: ChildLink<PackageDeclaration>,
    pub(crate) comments: ChildList<Comment>,
    pub(crate) native_blocks: ChildList<NativeDeclaration>,
    pub(crate) types: ChildList<TypeDeclaration>,
}

impl UnitNode {
    pub fn package(&self) -> &ChildLink<PackageDeclaration> {
        &self.package
    }

    pub fn comments(&self) -> &ChildList<Comment> {
        &self.comments
    }

    pub fn native_blocks(&self) -> &ChildList<NativeDeclaration> {
        &self.native_blocks
    }

    pub fn types(&self) -> &ChildList<TypeDeclaration> {
        &self.types
    }
}

/// `package a.b.c;` Empty name for the default package.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageDeclaration {
    pub name: String,
}

impl PackageDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        PackageDeclaration { name: name.into() }
    }

    pub fn is_default(&self) -> bool {
        self.name.is_empty()
    }
}

impl SlotType for PackageDeclaration {
    fn admits(kind: NodeKind) -> bool {
        kind == NodeKind::PackageDeclaration
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    Line,
    Block,
    Doc,
}

/// A source comment. Its text is the unit source under the node's span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
}

impl Comment {
    pub fn new(kind: CommentKind) -> Self {
        Comment { kind }
    }
}

impl SlotType for Comment {
    fn admits(kind: NodeKind) -> bool {
        kind == NodeKind::Comment
    }
}

/// Verbatim target-language code carried through translation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeDeclaration {
    pub header_code: Option<String>,
    pub implementation_code: Option<String>,
}

impl NativeDeclaration {
    pub fn new(header_code: Option<String>, implementation_code: Option<String>) -> Self {
        NativeDeclaration {
            header_code,
            implementation_code,
        }
    }
}

impl SlotType for NativeDeclaration {
    fn admits(kind: NodeKind) -> bool {
        kind == NodeKind::NativeDeclaration
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
    Record,
}

/// A class, interface, enum, annotation or record declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub kind: TypeDeclKind,
    pub name: String,
    pub identity: TypeIdentity,
    pub(crate) members: ChildList<BodyDeclaration>,
}

impl TypeDeclaration {
    pub fn new(kind: TypeDeclKind, name: impl Into<String>, identity: TypeIdentity) -> Self {
        TypeDeclaration {
            kind,
            name: name.into(),
            identity,
            members: ChildList::new(),
        }
    }

    pub fn members(&self) -> &ChildList<BodyDeclaration> {
        &self.members
    }
}

impl SlotType for TypeDeclaration {
    fn admits(kind: NodeKind) -> bool {
        kind == NodeKind::TypeDeclaration
    }
}

/// A method or constructor. Annotations are stored by name as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub name: String,
    pub annotations: Vec<String>,
    pub is_constructor: bool,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        MethodDeclaration {
            name: name.into(),
            annotations: Vec::new(),
            is_constructor: false,
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Whether an annotation with this simple name is present.
    ///
    /// `Test`, `@Test` and `org.junit.Test` all match `"Test"`.
    pub fn is_annotated(&self, simple_name: &str) -> bool {
        self.annotations.iter().any(|annotation| {
            let annotation = annotation.trim_start_matches('@');
            annotation.rsplit('.').next() == Some(simple_name)
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDeclaration {
    pub name: String,
    pub type_name: String,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldDeclaration {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Payload of a tree node, one variant per [`NodeKind`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    CompilationUnit(UnitNode),
    PackageDeclaration(PackageDeclaration),
    Comment(Comment),
    NativeDeclaration(NativeDeclaration),
    TypeDeclaration(TypeDeclaration),
    MethodDeclaration(MethodDeclaration),
    FieldDeclaration(FieldDeclaration),
}

impl NodeData {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeData::CompilationUnit(_) => NodeKind::CompilationUnit,
            NodeData::PackageDeclaration(_) => NodeKind::PackageDeclaration,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::NativeDeclaration(_) => NodeKind::NativeDeclaration,
            NodeData::TypeDeclaration(_) => NodeKind::TypeDeclaration,
            NodeData::MethodDeclaration(_) => NodeKind::MethodDeclaration,
            NodeData::FieldDeclaration(_) => NodeKind::FieldDeclaration,
        }
    }

    /// Slots of this node in traversal order.
    pub fn slot_names(&self) -> &'static [SlotName] {
        match self {
            NodeData::CompilationUnit(_) => &[
                SlotName::Package,
                SlotName::Comments,
                SlotName::NativeBlocks,
                SlotName::Types,
            ],
            NodeData::TypeDeclaration(_) => &[SlotName::Members],
            NodeData::PackageDeclaration(_)
            | NodeData::Comment(_)
            | NodeData::NativeDeclaration(_)
            | NodeData::MethodDeclaration(_)
            | NodeData::FieldDeclaration(_) => &[],
        }
    }

    pub(crate) fn slot(&self, name: SlotName) -> Option<SlotView<'_>> {
        match (self, name) {
            (NodeData::CompilationUnit(unit), SlotName::Package) => Some(unit.package.view()),
            (NodeData::CompilationUnit(unit), SlotName::Comments) => Some(unit.comments.view()),
            (NodeData::CompilationUnit(unit), SlotName::NativeBlocks) => {
                Some(unit.native_blocks.view())
            }
            (NodeData::CompilationUnit(unit), SlotName::Types) => Some(unit.types.view()),
            (NodeData::TypeDeclaration(decl), SlotName::Members) => Some(decl.members.view()),
            _ => None,
        }
    }

    pub(crate) fn slot_mut(&mut self, name: SlotName) -> Option<SlotMut<'_>> {
        match (self, name) {
            (NodeData::CompilationUnit(unit), SlotName::Package) => Some(unit.package.view_mut()),
            (NodeData::CompilationUnit(unit), SlotName::Comments) => {
                Some(unit.comments.view_mut())
            }
            (NodeData::CompilationUnit(unit), SlotName::NativeBlocks) => {
                Some(unit.native_blocks.view_mut())
            }
            (NodeData::CompilationUnit(unit), SlotName::Types) => Some(unit.types.view_mut()),
            (NodeData::TypeDeclaration(decl), SlotName::Members) => {
                Some(decl.members.view_mut())
            }
            _ => None,
        }
    }

    /// Children of every slot, paired with the slot holding them.
    pub(crate) fn slot_children(&self) -> impl Iterator<Item = (SlotName, NodeId)> + '_ {
        self.slot_names().iter().flat_map(move |&name| {
            self.slot(name)
                .map(|view| view.children)
                .unwrap_or_default()
                .iter()
                .map(move |&child| (name, child))
        })
    }

    /// Copy of this payload with every child id passed through `f`.
    ///
    /// Stops at the first error.
    pub(crate) fn try_map_children<E>(
        &self,
        mut f: impl FnMut(NodeId) -> Result<NodeId, E>,
    ) -> Result<NodeData, E> {
        Ok(match self {
            NodeData::CompilationUnit(unit) => NodeData::CompilationUnit(UnitNode {
                package: unit.package.try_map(&mut f)?,
                comments: unit.comments.try_map(&mut f)?,
                native_blocks: unit.native_blocks.try_map(&mut f)?,
                types: unit.types.try_map(&mut f)?,
            }),
            NodeData::TypeDeclaration(decl) => NodeData::TypeDeclaration(TypeDeclaration {
                kind: decl.kind,
                name: decl.name.clone(),
                identity: decl.identity.clone(),
                members: decl.members.try_map(&mut f)?,
            }),
            NodeData::PackageDeclaration(_)
            | NodeData::Comment(_)
            | NodeData::NativeDeclaration(_)
            | NodeData::MethodDeclaration(_)
            | NodeData::FieldDeclaration(_) => self.clone(),
        })
    }

    /// Equality of everything except child ids.
    pub(crate) fn same_payload(&self, other: &NodeData) -> bool {
        match (self, other) {
            (NodeData::CompilationUnit(_), NodeData::CompilationUnit(_)) => true,
            (NodeData::TypeDeclaration(a), NodeData::TypeDeclaration(b)) => {
                a.kind == b.kind && a.name == b.name && a.identity == b.identity
            }
            (NodeData::PackageDeclaration(a), NodeData::PackageDeclaration(b)) => a == b,
            (NodeData::Comment(a), NodeData::Comment(b)) => a == b,
            (NodeData::NativeDeclaration(a), NodeData::NativeDeclaration(b)) => a == b,
            (NodeData::MethodDeclaration(a), NodeData::MethodDeclaration(b)) => a == b,
            (NodeData::FieldDeclaration(a), NodeData::FieldDeclaration(b)) => a == b,
            _ => false,
        }
    }

    /// Name of the first required field left empty, if any.
    pub(crate) fn missing_field(&self) -> Option<&'static str> {
        match self {
            NodeData::TypeDeclaration(decl) if decl.name.is_empty() => Some("name"),
            NodeData::TypeDeclaration(decl) if decl.identity.as_str().is_empty() => {
                Some("identity")
            }
            NodeData::MethodDeclaration(method) if method.name.is_empty() => Some("name"),
            NodeData::FieldDeclaration(field) if field.name.is_empty() => Some("name"),
            _ => None,
        }
    }

    /// This payload with every slot emptied.
    pub(crate) fn without_children(self) -> NodeData {
        match self {
            NodeData::CompilationUnit(_) => NodeData::CompilationUnit(UnitNode::default()),
            NodeData::TypeDeclaration(decl) => NodeData::TypeDeclaration(TypeDeclaration {
                members: ChildList::new(),
                ..decl
            }),
            other => other,
        }
    }

    /// Put back the slot contents of `original`, a payload of the same kind.
    pub(crate) fn restore_slots(&mut self, original: &NodeData) {
        match (self, original) {
            (NodeData::CompilationUnit(unit), NodeData::CompilationUnit(before)) => {
                *unit = before.clone();
            }
            (NodeData::TypeDeclaration(decl), NodeData::TypeDeclaration(before)) => {
                decl.members = before.members.clone();
            }
            _ => {}
        }
    }

    pub fn as_type_declaration(&self) -> Option<&TypeDeclaration> {
        match self {
            NodeData::TypeDeclaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_method_declaration(&self) -> Option<&MethodDeclaration> {
        match self {
            NodeData::MethodDeclaration(method) => Some(method),
            _ => None,
        }
    }

    pub fn as_package_declaration(&self) -> Option<&PackageDeclaration> {
        match self {
            NodeData::PackageDeclaration(package) => Some(package),
            _ => None,
        }
    }
}

impl From<PackageDeclaration> for NodeData {
    fn from(value: PackageDeclaration) -> Self {
        NodeData::PackageDeclaration(value)
    }
}

impl From<Comment> for NodeData {
    fn from(value: Comment) -> Self {
        NodeData::Comment(value)
    }
}

impl From<NativeDeclaration> for NodeData {
    fn from(value: NativeDeclaration) -> Self {
        NodeData::NativeDeclaration(value)
    }
}

impl From<TypeDeclaration> for NodeData {
    fn from(value: TypeDeclaration) -> Self {
        NodeData::TypeDeclaration(value)
    }
}

impl From<MethodDeclaration> for NodeData {
    fn from(value: MethodDeclaration) -> Self {
        NodeData::MethodDeclaration(value)
    }
}

impl From<FieldDeclaration> for NodeData {
    fn from(value: FieldDeclaration) -> Self {
        NodeData::FieldDeclaration(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_identity_simple_name() {
        assert_eq!(TypeIdentity::new("a.b.Outer.Inner").simple_name(), "Inner");
        assert_eq!(TypeIdentity::new("Plain").simple_name(), "Plain");
    }

    #[test]
    fn test_is_annotated_matches_simple_name() {
        let method = MethodDeclaration::new("testIt")
            .with_annotation("@org.junit.Test")
            .with_annotation("Override");
        assert!(method.is_annotated("Test"));
        assert!(method.is_annotated("Override"));
        assert!(!method.is_annotated("Before"));
    }

    #[test]
    fn test_slot_names_follow_traversal_order() {
        let unit = NodeData::CompilationUnit(UnitNode::default());
        assert_eq!(
            unit.slot_names(),
            &[
                SlotName::Package,
                SlotName::Comments,
                SlotName::NativeBlocks,
                SlotName::Types
            ]
        );
        let method = NodeData::from(MethodDeclaration::new("run"));
        assert!(method.slot_names().is_empty());
        assert!(method.slot(SlotName::Members).is_none());
    }

    #[test]
    fn test_body_declaration_admits_members_only() {
        assert!(BodyDeclaration::admits(NodeKind::MethodDeclaration));
        assert!(BodyDeclaration::admits(NodeKind::FieldDeclaration));
        assert!(BodyDeclaration::admits(NodeKind::TypeDeclaration));
        assert!(!BodyDeclaration::admits(NodeKind::Comment));
        assert!(!PackageDeclaration::admits(NodeKind::TypeDeclaration));
    }

    #[test]
    fn test_missing_field() {
        let decl = TypeDeclaration::new(TypeDeclKind::Class, "", TypeIdentity::new("p.A"));
        assert_eq!(NodeData::from(decl).missing_field(), Some("name"));
        let field = FieldDeclaration::new("count", "int");
        assert_eq!(NodeData::from(field).missing_field(), None);
    }
}

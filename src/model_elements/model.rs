use std::collections::{HashMap, VecDeque};

use crate::Error;

use super::frame_elements::{Joint, JointIndex, Link, LinkIndex};

#[cfg(test)]
#[path = "model_tests.rs"]
mod model_tests;

/// Defines the kinematic and dynamic model of an articulated rigid-body mechanism.
///
/// The model is an arena of [Link]s and [Joint]s, addressed by dense [LinkIndex] and
/// [JointIndex] values that follow the insertion order. The links and joints form a tree: adding a
/// joint that would close a kinematic loop is rejected. The model has no preferred root, a root is
/// only chosen when computing a [DynamicTraversal].
///
/// The degrees of freedom of the model are numbered in the order in which the joints were added.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// The links of the model, stored in insertion order.
    links: Vec<Link>,

    /// The joints of the model, stored in insertion order.
    joints: Vec<Joint>,

    /// The mapping from a link name to its index.
    link_names: HashMap<String, LinkIndex>,

    /// The mapping from a joint name to its index.
    joint_names: HashMap<String, JointIndex>,

    /// Per link the joints attached to that link, in insertion order.
    neighbors: Vec<Vec<JointIndex>>,

    /// The total number of degrees of freedom.
    nr_of_dofs: usize,
}

impl Model {
    /// Adds a new joint to the model and returns its index.
    ///
    /// ## Parameters
    ///
    /// * 'joint' - The joint that should be stored. Both links of the joint should already be
    ///   part of the model.
    ///
    /// ## Errors
    ///
    /// * [Error::JointAlreadyExists] - Returned when a joint with the same name is already stored.
    /// * [Error::InvalidLinkIndex] - Returned when one of the links of the joint is not stored.
    /// * [Error::KinematicLoop] - Returned when the two links are already connected, either
    ///   directly or through other joints, or when the joint connects a link to itself.
    pub fn add_joint(&mut self, mut joint: Joint) -> Result<JointIndex, Error> {
        if self.joint_names.contains_key(joint.name()) {
            return Err(Error::JointAlreadyExists {
                name: joint.name().to_string(),
            });
        }

        for link in [joint.first_link(), joint.second_link()] {
            if !self.is_valid_link(link) {
                return Err(Error::InvalidLinkIndex { index: link });
            }
        }

        if self.are_connected(joint.first_link(), joint.second_link()) {
            return Err(Error::KinematicLoop {
                joint: joint.name().to_string(),
            });
        }

        let index = JointIndex::new(self.joints.len());
        joint.set_dof_offset(self.nr_of_dofs);
        self.nr_of_dofs += joint.nr_of_dofs();

        self.neighbors[joint.first_link().index()].push(index);
        self.neighbors[joint.second_link().index()].push(index);
        self.joint_names.insert(joint.name().to_string(), index);
        self.joints.push(joint);

        Ok(index)
    }

    /// Adds a new link to the model and returns its index.
    ///
    /// ## Errors
    ///
    /// * [Error::LinkAlreadyExists] - Returned when a link with the same name is already stored.
    pub fn add_link(&mut self, link: Link) -> Result<LinkIndex, Error> {
        if self.link_names.contains_key(link.name()) {
            return Err(Error::LinkAlreadyExists {
                name: link.name().to_string(),
            });
        }

        let index = LinkIndex::new(self.links.len());
        self.link_names.insert(link.name().to_string(), index);
        self.links.push(link);
        self.neighbors.push(Vec::new());

        Ok(index)
    }

    fn are_connected(&self, from: LinkIndex, to: LinkIndex) -> bool {
        if from == to {
            return true;
        }

        let mut visited = vec![false; self.links.len()];
        let mut queue = VecDeque::from([from]);
        visited[from.index()] = true;
        while let Some(link) = queue.pop_front() {
            for joint_index in &self.neighbors[link.index()] {
                let other = match self.joints[joint_index.index()].other_link(link) {
                    Some(l) => l,
                    None => continue,
                };

                if other == to {
                    return true;
                }

                if !visited[other.index()] {
                    visited[other.index()] = true;
                    queue.push_back(other);
                }
            }
        }

        false
    }

    /// Computes the breadth-first traversal of the model starting at the given base link.
    ///
    /// The neighbors of a link are visited in the order in which their joints were added.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidLinkIndex] - Returned when the base link is not part of the model.
    /// * [Error::DisconnectedModel] - Returned when not every link can be reached from the base.
    pub fn compute_full_tree_traversal(&self, base: LinkIndex) -> Result<DynamicTraversal, Error> {
        if !self.is_valid_link(base) {
            return Err(Error::InvalidLinkIndex { index: base });
        }

        let nr_of_links = self.links.len();
        let mut traversal = DynamicTraversal {
            order: Vec::with_capacity(nr_of_links),
            parent_link: vec![None; nr_of_links],
            parent_joint: vec![None; nr_of_links],
            children: vec![Vec::new(); nr_of_links],
            child_of_joint: vec![None; self.joints.len()],
        };

        let mut visited = vec![false; nr_of_links];
        let mut queue = VecDeque::from([base]);
        visited[base.index()] = true;
        while let Some(link) = queue.pop_front() {
            traversal.order.push(link);
            for joint_index in &self.neighbors[link.index()] {
                let child = match self.joints[joint_index.index()].other_link(link) {
                    Some(l) => l,
                    None => continue,
                };

                if visited[child.index()] {
                    continue;
                }

                visited[child.index()] = true;
                traversal.parent_link[child.index()] = Some(link);
                traversal.parent_joint[child.index()] = Some(*joint_index);
                traversal.children[link.index()].push(child);
                traversal.child_of_joint[joint_index.index()] = Some(child);
                queue.push_back(child);
            }
        }

        if let Some(unvisited) = visited.iter().position(|v| !v) {
            return Err(Error::DisconnectedModel {
                link: self.links[unvisited].name().to_string(),
            });
        }

        Ok(traversal)
    }

    /// Returns the link that is used as the base when no base is selected, i.e. the first link.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidLinkIndex] - Returned when the model has no links.
    pub fn default_base_link(&self) -> Result<LinkIndex, Error> {
        let base = LinkIndex::new(0);
        if !self.is_valid_link(base) {
            return Err(Error::InvalidLinkIndex { index: base });
        }

        Ok(base)
    }

    /// Returns a value indicating whether the link index refers to a link of the model.
    pub fn is_valid_link(&self, index: LinkIndex) -> bool {
        index.index() < self.links.len()
    }

    /// Returns a value indicating whether the joint index refers to a joint of the model.
    pub fn is_valid_joint(&self, index: JointIndex) -> bool {
        index.index() < self.joints.len()
    }

    /// Returns the joint with the given index.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidJointIndex] - Returned when the index does not refer to a joint.
    pub fn joint(&self, index: JointIndex) -> Result<&Joint, Error> {
        self.joints
            .get(index.index())
            .ok_or(Error::InvalidJointIndex { index })
    }

    /// Returns the index of the joint with the given name.
    ///
    /// ## Errors
    ///
    /// * [Error::MissingJoint] - Returned when there is no joint with the given name.
    pub fn joint_index(&self, name: &str) -> Result<JointIndex, Error> {
        self.joint_names
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingJoint {
                name: name.to_string(),
            })
    }

    /// Returns the joints of the model in insertion order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub(crate) fn joint_unchecked(&self, index: JointIndex) -> &Joint {
        &self.joints[index.index()]
    }

    /// Returns the link with the given index.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidLinkIndex] - Returned when the index does not refer to a link.
    pub fn link(&self, index: LinkIndex) -> Result<&Link, Error> {
        self.links
            .get(index.index())
            .ok_or(Error::InvalidLinkIndex { index })
    }

    /// Returns the index of the link with the given name.
    ///
    /// ## Errors
    ///
    /// * [Error::MissingLink] - Returned when there is no link with the given name.
    pub fn link_index(&self, name: &str) -> Result<LinkIndex, Error> {
        self.link_names
            .get(name)
            .copied()
            .ok_or_else(|| Error::MissingLink {
                name: name.to_string(),
            })
    }

    /// Returns the links of the model in insertion order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn link_unchecked(&self, index: LinkIndex) -> &Link {
        &self.links[index.index()]
    }

    /// Creates a new, empty, model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of degrees of freedom of the model.
    pub fn nr_of_dofs(&self) -> usize {
        self.nr_of_dofs
    }

    /// Returns the number of joints of the model.
    pub fn nr_of_joints(&self) -> usize {
        self.joints.len()
    }

    /// Returns the number of links of the model.
    pub fn nr_of_links(&self) -> usize {
        self.links.len()
    }
}

/// Defines a breadth-first visit of a [Model] from a base link.
///
/// Every visited link, except the base, has a parent link and a parent joint. Iterating over
/// [DynamicTraversal::links] visits parents before their children, iterating in reverse visits
/// children before their parents.
#[derive(Clone, Debug, PartialEq)]
pub struct DynamicTraversal {
    /// The links in visiting order. The first link is the base.
    order: Vec<LinkIndex>,

    /// Per link index the parent link, `None` for the base.
    parent_link: Vec<Option<LinkIndex>>,

    /// Per link index the joint connecting the link to its parent, `None` for the base.
    parent_joint: Vec<Option<JointIndex>>,

    /// Per link index the children of the link, in visiting order.
    children: Vec<Vec<LinkIndex>>,

    /// Per joint index the link that is the child of the joint in this traversal.
    child_of_joint: Vec<Option<LinkIndex>>,
}

impl DynamicTraversal {
    /// Returns the base link of the traversal.
    pub fn base_link(&self) -> LinkIndex {
        self.order[0]
    }

    /// Returns the link that is the child of the given joint, i.e. the link farther away from the
    /// base.
    pub fn child_link_of_joint(&self, joint: JointIndex) -> Option<LinkIndex> {
        self.child_of_joint.get(joint.index()).copied().flatten()
    }

    /// Returns the children of the given link.
    pub fn children(&self, link: LinkIndex) -> &[LinkIndex] {
        self.children
            .get(link.index())
            .map(|c| c.as_slice())
            .unwrap_or(&[])
    }

    /// Returns a value indicating whether the link is the base of the traversal.
    pub fn is_base(&self, link: LinkIndex) -> bool {
        self.base_link() == link
    }

    /// Returns the links in visiting order, parents before their children.
    pub fn links(&self) -> &[LinkIndex] {
        &self.order
    }

    /// Returns the number of links that are visited.
    pub fn nr_of_visited_links(&self) -> usize {
        self.order.len()
    }

    /// Returns the joint that connects the given link to its parent, or `None` for the base.
    pub fn parent_joint(&self, link: LinkIndex) -> Option<JointIndex> {
        self.parent_joint.get(link.index()).copied().flatten()
    }

    /// Returns the parent of the given link, or `None` for the base.
    pub fn parent_link(&self, link: LinkIndex) -> Option<LinkIndex> {
        self.parent_link.get(link.index()).copied().flatten()
    }
}

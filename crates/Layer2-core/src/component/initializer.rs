//! Resource Initializer - validate / ensure / prepare 실행
//!
//! 구체 타입별로 묶은 그룹(처음 발견된 순서)을 단위로 처리합니다. 그룹은 모든
//! 멤버의 자식이 준비를 마친 뒤에 한 번에 실행되므로, 자식의 콜백은 항상 부모의
//! 콜백보다 먼저 끝납니다.
//!
//! 타입 수준에 순환이 있어(예: Folder 안의 Folder) 그룹 전체가 준비될 수 없으면,
//! 자식이 끝난 멤버만 먼저 실행하고 나머지는 다음 차례로 미룹니다.

use super::{ResourceDescriptor, ResourceId, WalkedResource};
use crate::model::ResourceModel;
use keystone_foundation::{Result, TypeKey};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// 리소스 그룹 초기화기
pub struct ResourceInitializer<'a> {
    model: &'a ResourceModel,
}

impl<'a> ResourceInitializer<'a> {
    pub fn new(model: &'a ResourceModel) -> Self {
        Self { model }
    }

    /// 모든 리소스를 의존 순서대로 준비
    pub fn prepare_all(&self, walked: &[WalkedResource]) -> Result<()> {
        let mut done: HashSet<&ResourceId> = HashSet::new();
        let mut pending: Vec<&WalkedResource> = walked.iter().collect();

        while let Some((resource_type, batch)) = next_batch(&pending, &done) {
            let group: Vec<Arc<dyn ResourceDescriptor>> = batch
                .iter()
                .map(|w| Arc::clone(&w.descriptor))
                .collect();

            self.prepare_group(resource_type, &group)?;

            for resource in batch {
                done.insert(resource.descriptor.id());
            }
            pending.retain(|w| !done.contains(w.descriptor.id()));
        }

        Ok(())
    }

    fn prepare_group(
        &self,
        resource_type: TypeKey,
        group: &[Arc<dyn ResourceDescriptor>],
    ) -> Result<()> {
        let handler = self.model.resource_handler(resource_type)?;
        debug!("Preparing {} resource(s) of type {}", group.len(), resource_type);

        handler.validate(group)?;

        let creatable: Vec<Arc<dyn ResourceDescriptor>> = group
            .iter()
            .filter(|resource| resource.is_creatable())
            .cloned()
            .collect();
        if !creatable.is_empty() {
            handler.ensure(&creatable)?;
        }

        handler.prepare(group)
    }
}

type Group<'w> = (TypeKey, Vec<&'w WalkedResource>);

/// 다음에 실행할 그룹
///
/// 1. 모든 멤버가 준비 가능한 첫 타입 그룹 전체
/// 2. 없으면 (타입 수준 순환) 준비 가능한 멤버가 있는 첫 그룹의 해당 멤버들
fn next_batch<'w>(
    pending: &[&'w WalkedResource],
    done: &HashSet<&ResourceId>,
) -> Option<Group<'w>> {
    let ready = |w: &WalkedResource| w.children.iter().all(|child| done.contains(child));
    let groups = group_by_type(pending);

    if let Some(index) = groups
        .iter()
        .position(|(_, members)| members.iter().all(|w| ready(*w)))
    {
        return groups.into_iter().nth(index);
    }

    for (resource_type, members) in &groups {
        let ready_members: Vec<&'w WalkedResource> =
            members.iter().copied().filter(|w| ready(*w)).collect();
        if !ready_members.is_empty() {
            debug!(
                "Type {} depends on itself; preparing {} of {} resource(s) first",
                resource_type,
                ready_members.len(),
                members.len()
            );
            return Some((*resource_type, ready_members));
        }
    }

    // 순회 결과에는 순환 간선이 없으므로 남은 리소스가 있다면 위에서 반환됨
    groups.into_iter().next()
}

/// 남은 리소스를 구체 타입별로 묶음 (처음 발견된 순서 유지)
fn group_by_type<'w>(pending: &[&'w WalkedResource]) -> Vec<Group<'w>> {
    let mut groups: Vec<Group<'w>> = Vec::new();

    for &resource in pending {
        let resource_type = resource.descriptor.resource_type();
        match groups.iter_mut().find(|(t, _)| *t == resource_type) {
            Some((_, group)) => group.push(resource),
            None => groups.push((resource_type, vec![resource])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{walk, ComponentDescriptor, Components, ResourceId};
    use crate::model::ResourceHandler;
    use keystone_foundation::{declare_type, Error, Provenance};
    use parking_lot::Mutex;
    use std::any::Any;

    declare_type!(TOPIC = "Topic");
    declare_type!(CLUSTER = "Cluster");

    #[derive(Debug)]
    struct Res {
        id: ResourceId,
        kind: TypeKey,
        creatable: bool,
        children: Vec<Arc<dyn ResourceDescriptor>>,
    }

    impl ResourceDescriptor for Res {
        fn id(&self) -> &ResourceId {
            &self.id
        }
        fn resource_type(&self) -> TypeKey {
            self.kind
        }
        fn resources(&self) -> Vec<Arc<dyn ResourceDescriptor>> {
            self.children.clone()
        }
        fn is_creatable(&self) -> bool {
            self.creatable
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn res(
        id: &str,
        kind: &'static keystone_foundation::TypeDescriptor,
        creatable: bool,
        children: Vec<Arc<dyn ResourceDescriptor>>,
    ) -> Arc<dyn ResourceDescriptor> {
        Arc::new(Res {
            id: id.into(),
            kind: TypeKey::of(kind),
            creatable,
            children,
        })
    }

    #[derive(Debug)]
    struct Svc(Vec<Arc<dyn ResourceDescriptor>>);

    impl ComponentDescriptor for Svc {
        fn name(&self) -> &str {
            "svc"
        }
        fn resources(&self) -> Vec<Arc<dyn ResourceDescriptor>> {
            self.0.clone()
        }
    }

    /// 호출 기록: "<handler>.<callback>:<ids>"
    struct Recorder {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn record(&self, callback: &str, resources: &[Arc<dyn ResourceDescriptor>]) {
            let ids: Vec<_> = resources.iter().map(|r| r.id().to_string()).collect();
            self.calls
                .lock()
                .push(format!("{}.{}:{}", self.name, callback, ids.join(",")));
        }
    }

    impl ResourceHandler for Recorder {
        fn validate(&self, resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            self.record("validate", resources);
            Ok(())
        }
        fn ensure(&self, resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            self.record("ensure", resources);
            Ok(())
        }
        fn prepare(&self, resources: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            self.record("prepare", resources);
            Ok(())
        }
    }

    fn model_with_recorders(calls: &Arc<Mutex<Vec<String>>>) -> ResourceModel {
        let mut model = ResourceModel::new();
        model.set_initializing(Some(Provenance::new("TestProvider")));
        model
            .add_resource(
                TypeKey::of(&TOPIC),
                Arc::new(Recorder {
                    name: "topic",
                    calls: Arc::clone(calls),
                }),
            )
            .unwrap()
            .add_resource(
                TypeKey::of(&CLUSTER),
                Arc::new(Recorder {
                    name: "cluster",
                    calls: Arc::clone(calls),
                }),
            )
            .unwrap();
        model.set_initializing(None);
        model
    }

    #[test]
    fn test_children_before_parents_batched_by_type() {
        let cluster = res("c1", &CLUSTER, false, vec![]);
        let t1 = res("t1", &TOPIC, true, vec![cluster.clone()]);
        let t2 = res("t2", &TOPIC, false, vec![cluster]);
        let components = Components::from(Arc::new(Svc(vec![t1, t2])) as Arc<dyn ComponentDescriptor>);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let model = model_with_recorders(&calls);
        ResourceInitializer::new(&model)
            .prepare_all(&walk(&components))
            .unwrap();

        assert_eq!(
            *calls.lock(),
            vec![
                "cluster.validate:c1",
                "cluster.prepare:c1",
                "topic.validate:t1,t2",
                "topic.ensure:t1",
                "topic.prepare:t1,t2",
            ]
        );
    }

    #[test]
    fn test_type_group_spanning_depths_runs_once() {
        let cluster = res("c1", &CLUSTER, false, vec![]);
        let t1 = res("t1", &TOPIC, false, vec![]);
        let t2 = res("t2", &TOPIC, false, vec![cluster]);
        let components = Components::from(Arc::new(Svc(vec![t1, t2])) as Arc<dyn ComponentDescriptor>);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let model = model_with_recorders(&calls);
        ResourceInitializer::new(&model)
            .prepare_all(&walk(&components))
            .unwrap();

        assert_eq!(
            *calls.lock(),
            vec![
                "cluster.validate:c1",
                "cluster.prepare:c1",
                "topic.validate:t1,t2",
                "topic.prepare:t1,t2",
            ]
        );
    }

    #[test]
    fn test_type_cycle_splits_group_in_post_order() {
        // Topic -> Cluster -> Topic: 타입 수준 순환
        let inner = res("t0", &TOPIC, false, vec![]);
        let cluster = res("c1", &CLUSTER, false, vec![inner]);
        let outer = res("t1", &TOPIC, false, vec![cluster]);
        let components = Components::from(Arc::new(Svc(vec![outer])) as Arc<dyn ComponentDescriptor>);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let model = model_with_recorders(&calls);
        ResourceInitializer::new(&model)
            .prepare_all(&walk(&components))
            .unwrap();

        assert_eq!(
            *calls.lock(),
            vec![
                "topic.validate:t0",
                "topic.prepare:t0",
                "cluster.validate:c1",
                "cluster.prepare:c1",
                "topic.validate:t1",
                "topic.prepare:t1",
            ]
        );
    }

    #[test]
    fn test_shared_id_prepared_once() {
        let a = res("shared", &TOPIC, false, vec![]);
        let b = res("shared", &TOPIC, false, vec![]);
        let components = Components::from(Arc::new(Svc(vec![a, b])) as Arc<dyn ComponentDescriptor>);

        let calls = Arc::new(Mutex::new(Vec::new()));
        let model = model_with_recorders(&calls);
        ResourceInitializer::new(&model)
            .prepare_all(&walk(&components))
            .unwrap();

        assert_eq!(
            *calls.lock(),
            vec!["topic.validate:shared", "topic.prepare:shared"]
        );
    }

    struct NotOwning;

    impl ResourceHandler for NotOwning {
        fn validate(&self, _: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            Ok(())
        }
        fn prepare(&self, _: &[Arc<dyn ResourceDescriptor>]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_ensure_rejects_creatable_resources() {
        let mut model = ResourceModel::new();
        model.set_initializing(Some(Provenance::new("TestProvider")));
        model
            .add_resource(TypeKey::of(&TOPIC), Arc::new(NotOwning))
            .unwrap();

        let owned = res("owned", &TOPIC, true, vec![]);
        let components = Components::from(Arc::new(Svc(vec![owned])) as Arc<dyn ComponentDescriptor>);

        let err = ResourceInitializer::new(&model)
            .prepare_all(&walk(&components))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedOperation(_)));
    }
}

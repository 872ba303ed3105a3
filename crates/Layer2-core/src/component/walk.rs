//! Resource Walk - 리소스 그래프 깊이 우선 순회

use super::{Components, ResourceDescriptor, ResourceId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// 순회 결과 항목
#[derive(Debug, Clone)]
pub struct WalkedResource {
    /// 해당 id로 처음 발견된 디스크립터
    pub descriptor: Arc<dyn ResourceDescriptor>,

    /// 가장 깊은 하위 리소스까지의 거리 (하위 리소스가 없으면 0)
    ///
    /// 자식은 항상 부모보다 낮습니다 (순환 간선 제외).
    pub height: usize,

    /// 순회 중 따라간 자식 리소스 id (순환 간선 제외, 중복 없음)
    pub children: Vec<ResourceId>,
}

enum Visit {
    InProgress,
    Done(usize),
}

struct Walker {
    status: HashMap<ResourceId, Visit>,
    edges: HashMap<ResourceId, Vec<ResourceId>>,
    order: Vec<Arc<dyn ResourceDescriptor>>,
}

impl Walker {
    /// 방문 중인 노드로 되돌아가는 간선은 `None` (무시)
    fn visit(&mut self, resource: &Arc<dyn ResourceDescriptor>) -> Option<usize> {
        match self.status.get(resource.id()) {
            Some(Visit::InProgress) => return None,
            Some(Visit::Done(height)) => return Some(*height),
            None => {}
        }

        let id = resource.id().clone();
        self.status.insert(id.clone(), Visit::InProgress);
        self.order.push(Arc::clone(resource));

        let mut height = 0;
        let mut children: Vec<ResourceId> = Vec::new();
        for child in resource.resources() {
            if let Some(child_height) = self.visit(&child) {
                height = height.max(child_height + 1);
                if !children.contains(child.id()) {
                    children.push(child.id().clone());
                }
            }
        }

        self.edges.insert(id.clone(), children);
        self.status.insert(id, Visit::Done(height));
        Some(height)
    }
}

/// 모든 컴포넌트의 리소스를 처음 발견된 순서로 반환
///
/// 같은 id는 처음 발견된 디스크립터만 남깁니다. 자기 참조나 상호 참조가 있어도 종료합니다.
pub fn walk(components: &Components) -> Vec<WalkedResource> {
    let mut walker = Walker {
        status: HashMap::new(),
        edges: HashMap::new(),
        order: Vec::new(),
    };

    for component in components.iter() {
        for resource in component.resources() {
            walker.visit(&resource);
        }
    }

    let Walker {
        status,
        mut edges,
        order,
    } = walker;
    let walked: Vec<WalkedResource> = order
        .into_iter()
        .map(|descriptor| {
            let height = match status.get(descriptor.id()) {
                Some(Visit::Done(height)) => *height,
                _ => 0,
            };
            let children = edges.remove(descriptor.id()).unwrap_or_default();
            WalkedResource {
                descriptor,
                height,
                children,
            }
        })
        .collect();

    debug!("Resource walk found {} unique resource(s)", walked.len());
    walked
}

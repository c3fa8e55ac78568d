//! Injector introspection.

use crate::binding::Binding;
use crate::injector::Injector;
use crate::key::TypeKey;

/// Snapshot of one binding, as handed to [`Inspector`] callbacks.
pub struct BindingReport {
    pub annotation: String,
    pub to: Option<TypeKey>,
    pub provider: bool,
    pub instance: bool,
    pub scope: Option<TypeKey>,
    pub eager: bool,
}

impl BindingReport {
    fn from_binding(binding: &Binding) -> Self {
        Self {
            annotation: binding.annotation().to_string(),
            to: binding.to_key(),
            provider: binding.has_provider(),
            instance: binding.has_instance(),
            scope: binding.scope_key(),
            eager: binding.is_eager(),
        }
    }
}

/// Callbacks called during injector inspection.
///
/// Only the callbacks that are set are invoked. Inspection walks the current
/// injector; the parent is handed to `parent` for the caller to descend
/// explicitly.
#[derive(Default)]
pub struct Inspector<'a> {
    pub binding: Option<Box<dyn FnMut(TypeKey, &BindingReport) + 'a>>,
    pub multi_binding: Option<Box<dyn FnMut(TypeKey, usize, &BindingReport) + 'a>>,
    pub map_binding: Option<Box<dyn FnMut(TypeKey, &str, &BindingReport) + 'a>>,
    pub parent: Option<Box<dyn FnMut(&Injector) + 'a>>,
}

impl Injector {
    /// Enumerates this injector's bindings through the inspector.
    pub fn inspect(&self, inspector: &mut Inspector<'_>) {
        if let Some(callback) = inspector.binding.as_mut() {
            for (typ, report) in self.binding_reports() {
                callback(typ, &report);
            }
        }

        if let Some(callback) = inspector.multi_binding.as_mut() {
            for (typ, index, report) in self.multi_binding_reports() {
                callback(typ, index, &report);
            }
        }

        if let Some(callback) = inspector.map_binding.as_mut() {
            for (typ, key, report) in self.map_binding_reports() {
                callback(typ, &key, &report);
            }
        }

        if let Some(callback) = inspector.parent.as_mut() {
            if let Some(parent) = self.parent() {
                callback(parent);
            }
        }
    }

    fn binding_reports(&self) -> Vec<(TypeKey, BindingReport)> {
        self.snapshot_bindings()
            .into_iter()
            .map(|(typ, binding)| (typ, BindingReport::from_binding(&binding)))
            .collect()
    }

    fn multi_binding_reports(&self) -> Vec<(TypeKey, usize, BindingReport)> {
        self.snapshot_multibindings()
            .into_iter()
            .map(|(typ, index, binding)| (typ, index, BindingReport::from_binding(&binding)))
            .collect()
    }

    fn map_binding_reports(&self) -> Vec<(TypeKey, String, BindingReport)> {
        self.snapshot_mapbindings()
            .into_iter()
            .map(|(typ, key, binding)| (typ, key, BindingReport::from_binding(&binding)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_reports_bindings() {
        let injector = Injector::new(vec![]).unwrap();
        injector
            .bind::<String>()
            .annotated_with("greeting")
            .to_instance("hi".to_string());
        injector.bind_multi::<String>().to_instance("a".to_string());
        injector
            .bind_map::<String>("key")
            .to_instance("entry".to_string());

        let mut singles = Vec::new();
        let mut multis = Vec::new();
        let mut maps = Vec::new();

        let mut inspector = Inspector {
            binding: Some(Box::new(|typ, report: &BindingReport| {
                singles.push((typ, report.annotation.clone(), report.instance));
            })),
            multi_binding: Some(Box::new(|typ, index, _report: &BindingReport| {
                multis.push((typ, index));
            })),
            map_binding: Some(Box::new(|typ, key: &str, _report: &BindingReport| {
                maps.push((typ, key.to_string()));
            })),
            parent: None,
        };
        injector.inspect(&mut inspector);
        drop(inspector);

        let string_key = TypeKey::of::<String>();
        assert!(singles.contains(&(string_key, "greeting".to_string(), true)));
        assert_eq!(multis, vec![(string_key, 0)]);
        assert_eq!(maps, vec![(string_key, "key".to_string())]);
    }

    #[test]
    fn test_inspect_hands_over_the_parent() {
        let parent = Injector::new(vec![]).unwrap();
        let child = parent.child();

        let mut saw_parent = false;
        let mut inspector = Inspector {
            parent: Some(Box::new(|_parent: &Injector| {
                saw_parent = true;
            })),
            ..Inspector::default()
        };
        child.inspect(&mut inspector);
        drop(inspector);

        assert!(saw_parent);
    }

    #[test]
    fn test_inspect_does_not_cross_into_the_parent() {
        let parent = Injector::new(vec![]).unwrap();
        parent.bind::<u32>().to_instance(1u32);
        let child = parent.child();

        let mut seen = Vec::new();
        let mut inspector = Inspector {
            binding: Some(Box::new(|typ, _report: &BindingReport| {
                seen.push(typ);
            })),
            ..Inspector::default()
        };
        child.inspect(&mut inspector);
        drop(inspector);

        assert!(!seen.contains(&TypeKey::of::<u32>()));
    }
}

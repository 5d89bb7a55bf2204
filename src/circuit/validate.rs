//! Binding validation.

use crate::component::{Component, Connector, ConnectorRole, Domain};
use crate::error::{CompileError, Result};

use super::Binding;

/// Check that the two ends of a binding have the right roles.
///
/// The output end must be an output connector and the input end an input
/// connector; feeding an input twice is checked by the composer.
pub fn check_roles(binding: &Binding, output: &Connector, input: &Connector) -> Result<()> {
    if output.role != ConnectorRole::Output {
        return Err(CompileError::invalid_binding(
            &binding.output,
            &binding.input,
            format!("'{}' is an {} connector, not an output", binding.output, output.role),
        ));
    }
    if input.role != ConnectorRole::Input {
        return Err(CompileError::invalid_binding(
            &binding.output,
            &binding.input,
            format!("'{}' is an {} connector, not an input", binding.input, input.role),
        ));
    }
    Ok(())
}

/// Check that both connectors spell the same domain sequence.
///
/// Domains are compared by name and orientation, position by position;
/// the first difference is reported (1-based).
pub fn check_sequences(
    binding: &Binding,
    producer: &Component,
    output: &Connector,
    consumer: &Component,
    input: &Connector,
) -> Result<()> {
    let mismatch = |position: usize, message: String| CompileError::ConnectorMismatch {
        output: binding.output.to_string(),
        input: binding.input.to_string(),
        position,
        message,
    };

    for (i, (o, n)) in output.domains.iter().zip(&input.domains).enumerate() {
        let out_name = &producer.domains.domain(o.id).name;
        let in_name = &consumer.domains.domain(n.id).name;
        if out_name != in_name || o.orientation != n.orientation {
            return Err(mismatch(
                i + 1,
                format!(
                    "output has '{}', input expects '{}'",
                    producer.domains.display_ref(o),
                    consumer.domains.display_ref(n)
                ),
            ));
        }
    }

    if output.domains.len() != input.domains.len() {
        let shorter = output.domains.len().min(input.domains.len());
        return Err(mismatch(
            shorter + 1,
            format!(
                "output has {} domains, input has {}",
                output.domains.len(),
                input.domains.len()
            ),
        ));
    }
    Ok(())
}

/// Same-named domains of two bound components become one domain, so they
/// must agree on their length class and their sequence constraint.
pub fn check_shared_domains(producer: &Component, consumer: &Component) -> Result<()> {
    let conflict = |domain: &Domain, first: String, second: String| CompileError::DomainConflict {
        domain: domain.name.clone(),
        first_component: producer.name.clone(),
        first,
        second_component: consumer.name.clone(),
        second,
    };
    let pattern = |d: &Domain| match d.pattern() {
        Some(p) => format!("sequence \"{p}\""),
        None => "unconstrained".to_string(),
    };

    for (_, domain) in producer.domains.iter() {
        let Some(other) = consumer.domains.get(&domain.name) else {
            continue;
        };
        let other = consumer.domains.domain(other);
        if other.length != domain.length {
            return Err(conflict(
                domain,
                format!("length {}", domain.length),
                format!("length {}", other.length),
            ));
        }
        if other.pattern() != domain.pattern() {
            return Err(conflict(domain, pattern(domain), pattern(other)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::ConnectorRef;
    use crate::component::compile_str;

    fn component(text: &str) -> Component {
        compile_str(text).unwrap().component
    }

    fn binding(from: &str, to: &str) -> Binding {
        Binding::new(from.parse().unwrap(), to.parse().unwrap())
    }

    fn connector<'a>(c: &'a Component, name: &str) -> &'a Connector {
        c.connector(c.find_connector(name).unwrap())
    }

    #[test]
    fn test_identical_sequences_pass() {
        let src = component("declare component src: -> Y\nsequence u : 4\nsequence v : 6\nsequence Y = u v\n");
        let dst = component("declare component dst: Y ->\nsequence u : 4\nsequence v : 6\nsequence Y = u v\n");
        let b = binding("src.Y", "dst.Y");
        let (out, inp) = (connector(&src, "Y"), connector(&dst, "Y"));
        check_roles(&b, out, inp).unwrap();
        check_sequences(&b, &src, out, &dst, inp).unwrap();
        check_shared_domains(&src, &dst).unwrap();
    }

    #[test]
    fn test_length_difference_points_past_shorter() {
        let src = component("declare component src: -> Y\nsequence u : 4\nsequence Y = u u\n");
        let dst = component("declare component dst: Y ->\nsequence u : 4\nsequence Y = u\n");
        let b = binding("src.Y", "dst.Y");
        match check_sequences(&b, &src, connector(&src, "Y"), &dst, connector(&dst, "Y")) {
            Err(CompileError::ConnectorMismatch { position, message, .. }) => {
                assert_eq!(position, 2);
                assert_eq!(message, "output has 2 domains, input has 1");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_roles() {
        let c = component("declare component c: A -> B\nsequence u : 4\nsequence A = u\nsequence B = u\n");
        let b = binding("c.A", "c.B");
        let err = check_roles(&b, connector(&c, "A"), connector(&c, "B")).unwrap_err();
        assert!(err.to_string().contains("'c.A' is an input connector, not an output"));
        assert_eq!(b.output, ConnectorRef::new("c", "A"));
    }

    #[test]
    fn test_length_class_conflict() {
        let a = component("declare component a(long): -> X\nsequence u : long\nsequence X = u\n");
        let b = component("declare component b(short): X ->\nsequence u : short\nsequence X = u\n");
        match check_shared_domains(&a, &b) {
            Err(CompileError::DomainConflict { domain, first, second, .. }) => {
                assert_eq!(
                    (domain.as_str(), first.as_str(), second.as_str()),
                    ("u", "length long", "length short")
                );
            }
            other => panic!("expected domain conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_sequence_constraint_conflict() {
        let src = component("declare component src: -> Y\nsequence u = \"AAAA\" : 4\nsequence Y = u\n");
        let dst = component("declare component dst: Y ->\nsequence u = \"CCCC\" : 4\nsequence Y = u\n");
        let err = check_shared_domains(&src, &dst).unwrap_err();
        assert!(matches!(
            &err,
            CompileError::DomainConflict { first, second, .. }
                if first == "sequence \"AAAA\"" && second == "sequence \"CCCC\""
        ));
        assert!(err.to_string().contains("'src'"));

        let open = component("declare component dst: Y ->\nsequence u = \"NNNN\" : 4\nsequence Y = u\n");
        let bare = component("declare component dst: Y ->\nsequence u : 4\nsequence Y = u\n");
        check_shared_domains(&open, &bare).unwrap();
        assert!(matches!(
            check_shared_domains(&src, &bare),
            Err(CompileError::DomainConflict { second, .. }) if second == "unconstrained"
        ));
    }
}

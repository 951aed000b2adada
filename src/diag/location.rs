use super::{NodeRef, ScopeRef, SourceLoc};

// Where an instruction came from. `loc` is None for synthesized
// instructions which have no position in the user's source.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DebugLocation {
    pub loc: Option<SourceLoc>,
    pub scope: Option<ScopeRef>
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DebugScope {
    pub loc: Option<SourceLoc>,
    // the scope this one was inlined into, if it was inlined at all
    pub inlined_call_site: Option<ScopeRef>,
    // the declaration of the function inlined at this scope
    pub inlined_function_loc: Option<SourceLoc>
}

/// Location information for the nodes an evaluator hands out.
pub trait NodeLocations {
    /// None if `node` is not an instruction (an argument, say).
    fn instruction_location(&self, node: NodeRef) -> Option<DebugLocation>;
    fn scope(&self, scope: ScopeRef) -> DebugScope;
}

/// The operations we fold are usually deep inside code inlined from
/// libraries, which is all implementation detail as far as the user is
/// concerned. Walks the inlining chain of `loc` up to the first location
/// which actually points into source.
pub fn skip_internal_locations<N>(nodes: &N, loc: DebugLocation) -> DebugLocation
        where N: NodeLocations + ?Sized {
    let mut scope_ref = match (loc.loc, loc.scope) {
        (None, Some(scope)) => scope,
        _ => return loc
    };
    let mut scope = nodes.scope(scope_ref);

    while let Some(call_site) = scope.inlined_call_site {
        if scope.loc.is_some() {
            return DebugLocation { loc: scope.loc, scope: Some(scope_ref) }
        }
        // inlined from something the user can see, stop here
        if scope.inlined_function_loc.is_some() {
            break
        }
        scope_ref = call_site;
        scope = nodes.scope(call_site);
    }

    if scope.loc.is_some() {
        return DebugLocation { loc: scope.loc, scope: Some(scope_ref) }
    }
    loc
}

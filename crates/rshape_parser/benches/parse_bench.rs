use bumpalo::Bump;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rshape_parser::Parser;

// A component-props module mixing declarations with runtime code to skip.
const TYPESCRIPT_SOURCE: &str = r#"
import type { Ref, ComputedRef } from 'vue'
import { defineComponent, ref } from 'vue'
import * as utils from './utils'

export type Size = 'small' | 'medium' | 'large'
export type Variant = `${Size}-${'solid' | 'outline'}`

export interface BaseProps {
    id: string
    disabled?: boolean
    size?: Size
}

export interface ButtonProps extends BaseProps, Omit<NativeProps, 'onClick'> {
    label: string
    variant: Variant
    icon?: () => VNode
    onClick?(event: MouseEvent): void
    readonly [key: `data-${string}`]: unknown
}

type NativeProps = {
    onClick: (e: MouseEvent) => void
    tabIndex: number
}

type Mutable<T> = { -readonly [K in keyof T]: T[K] }
type Unwrap<T> = T extends Ref<infer V> ? V : T extends ComputedRef<infer C> ? C : T

export enum Tone { Neutral = 'neutral', Danger = 'danger' }

const counter = ref(0)
const classes = computed(() => [`btn-${props.size}`, { 'is-disabled': props.disabled }])

function emitClick(event: MouseEvent): void {
    if (!props.disabled) {
        emit('click', event)
    }
}

export class ButtonController<P extends ButtonProps = ButtonProps> {
    private state: Mutable<P> | null = null
    constructor(private readonly props: P) {}
    get label(): string { return this.props.label }
    press(times = 1): number { return counter.value += times }
}

export default defineComponent({
    name: 'RsButton',
    setup(props: ButtonProps) {
        return { classes, emitClick }
    },
})
"#;

fn bench_parse_declarations(c: &mut Criterion) {
    c.bench_function("parse_component_module", |b| {
        b.iter(|| {
            let arena = Bump::new();
            let mut parser = Parser::new(&arena, "bench.ts", black_box(TYPESCRIPT_SOURCE));
            let source_file = parser.parse_source_file();
            black_box(source_file);
        });
    });
}

criterion_group!(benches, bench_parse_declarations);
criterion_main!(benches);
